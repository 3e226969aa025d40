pub mod u601_train_fraud_model;
pub mod u602_predict_fraud;
