pub mod compare_sequences_use_case;
pub mod comparison_error;
pub mod comparison_logger;
