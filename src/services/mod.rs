pub mod image_input;
pub mod normalizer;
pub mod plain_text;
