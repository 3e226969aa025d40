use contracts::usecases::u601_train_fraud_model::{ClassificationMetrics, ConfusionMatrix};

/// ROC-AUC via the rank statistic; ties share the average rank.
/// `None` when only one class is present.
pub fn roc_auc(scores: &[f64], labels: &[u8]) -> Option<f64> {
    let n_pos = labels.iter().filter(|&&y| y == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut pos_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based: start+1 ..= end
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let positives = order[start..end]
            .iter()
            .filter(|&&i| labels[i] == 1)
            .count();
        pos_rank_sum += avg_rank * positives as f64;
        start = end;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Area under the precision-recall step curve (one step per distinct score)
pub fn average_precision(scores: &[f64], labels: &[u8]) -> Option<f64> {
    let n_pos = labels.iter().filter(|&&y| y == 1).count();
    if n_pos == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut prev_recall = 0.0;
    let mut ap = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            if labels[order[end]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            end += 1;
        }
        let recall = tp as f64 / n_pos as f64;
        let precision = tp as f64 / (tp + fp) as f64;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
        start = end;
    }
    Some(ap)
}

pub fn confusion_matrix(predictions: &[u8], labels: &[u8]) -> ConfusionMatrix {
    let mut cm = ConfusionMatrix::default();
    for (&pred, &label) in predictions.iter().zip(labels) {
        match (label, pred) {
            (0, 0) => cm.true_negative += 1,
            (0, _) => cm.false_positive += 1,
            (_, 0) => cm.false_negative += 1,
            _ => cm.true_positive += 1,
        }
    }
    cm
}

pub fn classification_metrics(
    probabilities: &[f64],
    labels: &[u8],
    threshold: f64,
) -> ClassificationMetrics {
    let predictions: Vec<u8> = probabilities
        .iter()
        .map(|&p| u8::from(p >= threshold))
        .collect();
    let confusion = confusion_matrix(&predictions, labels);

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(
        confusion.true_positive,
        confusion.true_positive + confusion.false_positive,
    );
    let recall = ratio(
        confusion.true_positive,
        confusion.true_positive + confusion.false_negative,
    );
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    ClassificationMetrics {
        roc_auc: roc_auc(probabilities, labels),
        average_precision: average_precision(probabilities, labels),
        precision,
        recall,
        f1,
        confusion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auc_perfect_and_reversed() {
        let labels = [0, 0, 1, 1];
        assert_eq!(roc_auc(&[0.1, 0.2, 0.8, 0.9], &labels), Some(1.0));
        assert_eq!(roc_auc(&[0.9, 0.8, 0.2, 0.1], &labels), Some(0.0));
    }

    #[test]
    fn auc_counts_ties_as_half() {
        let labels = [0, 1];
        assert_eq!(roc_auc(&[0.5, 0.5], &labels), Some(0.5));

        // pairs: (0.1,0.4) ok, (0.1,0.35) ok, (0.35,0.4) ok, (0.35,0.35) tie
        let auc = roc_auc(&[0.1, 0.35, 0.4, 0.35], &[0, 0, 1, 1]).unwrap();
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn auc_undefined_for_single_class() {
        assert_eq!(roc_auc(&[0.1, 0.2], &[1, 1]), None);
        assert_eq!(average_precision(&[0.1, 0.2], &[0, 0]), None);
    }

    #[test]
    fn average_precision_matches_hand_computation() {
        // ranking: 0.9(1) 0.8(0) 0.7(1) 0.1(0)
        // steps: recall .5 @ p 1.0, recall 1.0 @ p 2/3
        let ap = average_precision(&[0.1, 0.9, 0.7, 0.8], &[0, 1, 1, 0]).unwrap();
        assert!((ap - (0.5 + 0.5 * 2.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn metrics_at_threshold() {
        let metrics = classification_metrics(&[0.9, 0.6, 0.4, 0.2], &[1, 0, 1, 0], 0.5);
        assert_eq!(
            metrics.confusion,
            ConfusionMatrix {
                true_negative: 1,
                false_positive: 1,
                false_negative: 1,
                true_positive: 1,
            }
        );
        assert_eq!(metrics.confusion.total(), 4);
        assert_eq!(metrics.precision, 0.5);
        assert_eq!(metrics.recall, 0.5);
        assert_eq!(metrics.f1, 0.5);
    }
}
