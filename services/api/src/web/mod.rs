pub mod rest;
pub mod state;
pub mod summary_task;

// Re-export the REST handlers to make them easily accessible
// to the binary that will build the web server router.
pub use rest::{
    create_card_handler, delete_card_handler, generate_handler, list_cards_handler,
    toggle_step_handler,
};
