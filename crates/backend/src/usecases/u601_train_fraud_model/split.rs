use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Доля строк, уходящая в валидацию + тест (делится пополам)
pub const HOLDOUT_RATIO: f64 = 0.30;

/// Минимум строк на класс, чтобы каждая часть получила хотя бы одну
pub const MIN_CLASS_SAMPLES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
}

/// Стратифицированное разбиение 70/15/15 с фиксированным seed.
///
/// Каждый класс делится отдельно, поэтому доля класса 1 одинакова
/// во всех трех частях (с точностью до округления).
pub fn stratified_split(labels: &[u8], seed: u64) -> Result<SplitIndices, String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut split = SplitIndices {
        train: Vec::new(),
        validation: Vec::new(),
        test: Vec::new(),
    };

    for class in [0u8, 1u8] {
        let mut indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &y)| y == class)
            .map(|(i, _)| i)
            .collect();
        if indices.len() < MIN_CLASS_SAMPLES {
            return Err(format!(
                "class {} has {} rows, at least {} are required",
                class,
                indices.len(),
                MIN_CLASS_SAMPLES
            ));
        }
        indices.shuffle(&mut rng);

        let n = indices.len();
        let holdout = ((n as f64 * HOLDOUT_RATIO).round() as usize).clamp(2, n - 1);
        let validation = (holdout + 1) / 2;

        split.validation.extend_from_slice(&indices[..validation]);
        split.test.extend_from_slice(&indices[validation..holdout]);
        split.train.extend_from_slice(&indices[holdout..]);
    }

    split.train.sort_unstable();
    split.validation.sort_unstable();
    split.test.sort_unstable();
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positives(labels: &[u8], idx: &[usize]) -> usize {
        idx.iter().filter(|&&i| labels[i] == 1).count()
    }

    #[test]
    fn test_stratified_split_preserves_ratio() {
        // 800 negatives, 200 positives
        let labels: Vec<u8> = (0..1000).map(|i| u8::from(i % 5 == 0)).collect();
        let split = stratified_split(&labels, 42).unwrap();

        assert_eq!(split.train.len(), 700);
        assert_eq!(split.validation.len(), 150);
        assert_eq!(split.test.len(), 150);
        assert_eq!(positives(&labels, &split.train), 140);
        assert_eq!(positives(&labels, &split.validation), 30);
        assert_eq!(positives(&labels, &split.test), 30);
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let labels: Vec<u8> = (0..37).map(|i| u8::from(i % 3 == 0)).collect();
        let split = stratified_split(&labels, 7).unwrap();

        let mut all: Vec<usize> = split
            .train
            .iter()
            .chain(&split.validation)
            .chain(&split.test)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..37).collect::<Vec<_>>());
        for part in [&split.train, &split.validation, &split.test] {
            assert!(positives(&labels, part) >= 1);
            assert!(part.len() > positives(&labels, part));
        }
    }

    #[test]
    fn same_seed_same_split() {
        let labels: Vec<u8> = (0..50).map(|i| u8::from(i % 2 == 0)).collect();
        assert_eq!(
            stratified_split(&labels, 42).unwrap(),
            stratified_split(&labels, 42).unwrap()
        );
    }

    #[test]
    fn tiny_class_is_rejected() {
        let labels = [0, 0, 0, 0, 1, 1];
        let err = stratified_split(&labels, 42).unwrap_err();
        assert!(err.contains("class 1"));
    }
}
