pub mod health;
pub mod image_upload;
pub mod image_view;
pub mod status;
