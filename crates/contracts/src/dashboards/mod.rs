pub mod d400_orders_summary;
