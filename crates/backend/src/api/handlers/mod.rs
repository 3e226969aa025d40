// Dashboard handlers
pub mod d400_orders_summary;

// UseCase handlers
pub mod u602_predict_fraud;
