pub mod error;
pub mod national_id;
pub mod wire;
