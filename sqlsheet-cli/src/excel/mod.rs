//! Excel workbook output for extracted tables

pub mod writer;

pub use writer::write_workbook;
