pub mod compiler_frontend;
pub mod projects;
