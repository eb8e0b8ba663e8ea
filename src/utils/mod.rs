pub mod fs;
pub mod json;
pub mod paths;

pub use fs::{FileSystem, OsFileSystem};
pub use json::get_dotted;
pub use paths::{
    IdentityTranslator, PathGrammar, PathTranslator, WindowsToWsl, WslToWindows, to_windows_path,
    to_wsl_path,
};
