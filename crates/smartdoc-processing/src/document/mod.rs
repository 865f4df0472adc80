//! WordprocessingML (.docx) handling

pub mod converter;
pub mod style_map;
