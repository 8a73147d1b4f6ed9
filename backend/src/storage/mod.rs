pub mod render_store;
