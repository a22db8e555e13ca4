pub mod password_handler;
