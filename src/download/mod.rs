pub mod launcher;
pub mod torrent;

pub use launcher::open_with_default_handler;
pub use torrent::{save_torrent_file, torrent_file_name};
