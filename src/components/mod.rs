pub mod dashboard;
pub mod division_screen;
pub mod dynamic_form;
pub mod form_field;
pub mod login;
pub mod recent_submissions;
pub mod schema_studio;
