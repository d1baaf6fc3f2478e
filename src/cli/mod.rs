pub mod commands;
pub mod handlers;

pub use commands::{AddCommand, AddRecord, Cli, Commands};
pub use handlers::{
    handle_add_component, handle_add_prompt, handle_add_tag, handle_delete, handle_export,
    handle_generate, handle_get, handle_import, handle_init, handle_list, handle_update,
    handle_validate,
};
