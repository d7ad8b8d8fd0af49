pub mod comparison;
pub mod quantized;
