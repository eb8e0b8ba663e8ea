use std::time::Duration;

/// File name of the per-user config in a home directory
pub const CONFIG_FILE_NAME: &str = ".claude.json";

/// How long a parsed config stays valid before the file is read again
pub const CACHE_TTL: Duration = Duration::from_millis(5000);

/// Upper bound for the distro listing command
pub const LIST_TIMEOUT: Duration = Duration::from_secs(5);

pub const WSL_COMMAND: &str = "wsl.exe";
pub const WSL_LIST_ARGS: [&str; 2] = ["--list", "--quiet"];

// UNC roots for reaching a distro's filesystem from Windows
pub const UNC_MODERN_ROOT: &str = r"\\wsl.localhost";
pub const UNC_LEGACY_ROOT: &str = r"\\wsl$";

// Windows drives as seen from inside WSL
pub const MOUNT_ROOT: &str = "/mnt";
pub const DEFAULT_DRIVE: char = 'c';

/// Files looked up in a project directory for extra context
pub const CONTEXT_FILE_NAMES: [&str; 3] = [".claude.md", "CLAUDE.md", ".clauderc"];

/// Environment variables consulted for the Windows username from inside WSL
pub const USERNAME_ENV_VARS: [&str; 3] = ["USERNAME", "USER", "LOGNAME"];

/// Usernames probed when no environment variable gives a usable one
pub const CANDIDATE_USERNAMES: [&str; 4] = ["Administrator", "User", "user", "admin"];
