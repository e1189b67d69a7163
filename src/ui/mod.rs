pub mod board_view;
pub mod icons;
pub mod spinner;

pub use spinner::Spinner;
