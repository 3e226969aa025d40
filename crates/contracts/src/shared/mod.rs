pub mod order_schema;
