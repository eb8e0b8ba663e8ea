//! Finding WSL distros with a config file, from the Windows side.

use crate::constants::CONFIG_FILE_NAME;
use crate::context::Context;
use crate::facade::DataFacade;
use crate::types::{DiscoveredWslInstance, UncScheme};
use crate::utils::FileSystem;
use rayon::prelude::*;
use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::task;
use tokio::time::timeout;
use tracing::{debug, info};

pub type ListFuture<'a> = Pin<Box<dyn Future<Output = io::Result<Vec<u8>>> + Send + 'a>>;

/// Source of the raw distro listing (stdout of `wsl.exe --list --quiet`)
pub trait DistroLister: Send + Sync {
    fn list_distros_raw(&self) -> ListFuture<'_>;
}

/// Runs the distro listing command with a hard timeout
#[derive(Debug, Clone)]
pub struct WslCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl WslCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

impl DistroLister for WslCommand {
    fn list_distros_raw(&self) -> ListFuture<'_> {
        Box::pin(async move {
            let mut command = Command::new(&self.program);
            command
                .args(&self.args)
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true);

            let output = timeout(self.timeout, command.output())
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("{} did not finish within {:?}", self.program, self.timeout),
                    )
                })??;

            if !output.status.success() {
                return Err(io::Error::other(format!(
                    "{} exited with {}",
                    self.program, output.status
                )));
            }
            Ok(output.stdout)
        })
    }
}

/// Decode the listing output.
///
/// `wsl.exe` writes UTF-16LE; with `WSL_UTF8=1` set it writes UTF-8
/// instead, which shows up as output without any NUL bytes.
pub fn decode_listing(bytes: &[u8]) -> String {
    let text = if bytes.contains(&0) {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    text.replace(['\u{feff}', '\0'], "")
}

/// One distro name per line, `\r\n` tolerated, blank lines dropped
pub fn parse_distro_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Discovers distros reachable over UNC that hold a user config
#[derive(Debug, Clone)]
pub struct WslDiscoverer {
    ctx: Context,
}

impl WslDiscoverer {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Installed distro names; empty when the listing fails for any reason
    pub async fn list_distros(&self) -> Vec<String> {
        match self.ctx.lister.list_distros_raw().await {
            Ok(stdout) => {
                let distros = parse_distro_list(&decode_listing(&stdout));
                debug!(?distros, "Listed WSL distros");
                distros
            }
            Err(err) => {
                debug!(error = %err, "Listing WSL distros failed, assuming none");
                Vec::new()
            }
        }
    }

    /// Probe every distro under the modern UNC root; only if that finds
    /// nothing at all, probe every distro again under the legacy root.
    pub async fn discover_instances(&self) -> Vec<DiscoveredWslInstance> {
        let distros = self.list_distros().await;
        if distros.is_empty() {
            return Vec::new();
        }

        let found = self.probe_scheme(&distros, UncScheme::Modern).await;
        if !found.is_empty() {
            return found;
        }

        debug!(
            "Nothing found under {}, trying {}",
            UncScheme::Modern.root(),
            UncScheme::Legacy.root()
        );
        self.probe_scheme(&distros, UncScheme::Legacy).await
    }

    /// Facades for every discovered instance that passes a live read
    pub async fn discover_facades(&self) -> Vec<Arc<DataFacade>> {
        let mut facades = Vec::new();

        for instance in self.discover_instances().await {
            let facade = DataFacade::wsl_instance(&self.ctx, &instance);
            if facade.is_accessible().await {
                info!(
                    distro = %instance.distro_name,
                    path = %instance.config_path,
                    "Found WSL config"
                );
                facades.push(Arc::new(facade));
            } else {
                debug!(distro = %instance.distro_name, "WSL config not readable, skipping");
            }
        }

        facades
    }

    async fn probe_scheme(
        &self,
        distros: &[String],
        scheme: UncScheme,
    ) -> Vec<DiscoveredWslInstance> {
        let fs = Arc::clone(&self.ctx.fs);
        let distros = distros.to_vec();

        // Distros are independent; the ordered collect keeps listing order
        task::spawn_blocking(move || {
            distros
                .par_iter()
                .filter_map(|distro| probe_distro(fs.as_ref(), distro, scheme))
                .collect::<Vec<_>>()
        })
        .await
        .unwrap_or_default()
    }
}

/// First user under `<root>\<distro>\home` that has a config file
fn probe_distro(
    fs: &dyn FileSystem,
    distro: &str,
    scheme: UncScheme,
) -> Option<DiscoveredWslInstance> {
    let home = format!(r"{}\home", scheme.distro_root(distro));
    if !fs.is_dir(Path::new(&home)) {
        debug!(%home, "Home root not reachable");
        return None;
    }

    let mut users = match fs.list_dir_names(Path::new(&home)) {
        Ok(users) => users,
        Err(err) => {
            debug!(%home, error = %err, "Could not list home directories");
            return None;
        }
    };
    users.sort();

    users
        .iter()
        .filter(|user| !user.starts_with('.'))
        .map(|user| format!(r"{home}\{user}\{CONFIG_FILE_NAME}"))
        .find(|config_path| fs.is_file(Path::new(config_path)))
        .map(|config_path| DiscoveredWslInstance {
            distro_name: distro.to_string(),
            config_path,
            use_legacy_format: scheme.is_legacy(),
        })
}


#[cfg(test)]
mod tests {
    use super::testing::FakeLister;
    use super::*;
    use crate::environment::Environment;
    use crate::options::DiscoveryOptions;
    use crate::types::EnvironmentKind;
    use crate::utils::fs::MockFileSystem;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn windows_context(lister: FakeLister, fs: MockFileSystem) -> Context {
        Context::new(
            Environment::new(EnvironmentKind::Windows, r"C:\Users\u"),
            DiscoveryOptions::default(),
            Arc::new(fs),
            Arc::new(lister),
        )
    }

    /// Mock filesystem backed by a map of directories and files
    fn fake_tree(
        dirs: &[(&str, Vec<&str>)],
        files: &[&str],
    ) -> (MockFileSystem, Arc<Mutex<Vec<String>>>) {
        let listing: HashMap<String, Vec<String>> = dirs
            .iter()
            .map(|(dir, names)| {
                (dir.to_string(), names.iter().map(|n| n.to_string()).collect())
            })
            .collect();
        let listing = Arc::new(listing);
        let files: Arc<Vec<String>> = Arc::new(files.iter().map(|f| f.to_string()).collect());
        let probed = Arc::new(Mutex::new(Vec::new()));

        let mut fs = MockFileSystem::new();
        let dir_listing = Arc::clone(&listing);
        let dir_probes = Arc::clone(&probed);
        fs.expect_is_dir().returning(move |path| {
            let path = path.to_string_lossy().to_string();
            dir_probes.lock().unwrap().push(path.clone());
            dir_listing.contains_key(&path)
        });
        let names_listing = Arc::clone(&listing);
        fs.expect_list_dir_names().returning(move |path| {
            names_listing
                .get(&*path.to_string_lossy())
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        });
        let file_set = Arc::clone(&files);
        fs.expect_is_file()
            .returning(move |path| file_set.iter().any(|f| Path::new(f) == path));
        let readable = Arc::clone(&files);
        fs.expect_read_to_string().returning(move |path| {
            if readable.iter().any(|f| Path::new(f) == path) {
                Ok(r#"{"projects": {"/home/u/app": {}}}"#.to_string())
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        });

        (fs, probed)
    }

    #[test]
    fn test_parse_listing_crlf() {
        let lister_bytes: Vec<u8> = "Ubuntu\r\nDebian\r\n"
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        let distros = parse_distro_list(&decode_listing(&lister_bytes));

        assert_eq!(distros, vec!["Ubuntu", "Debian"]);
        assert!(distros.iter().all(|d| !d.contains('\r')));
    }

    #[test]
    fn test_decode_listing_with_bom_and_utf8() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("Alpine\r\n\r\n".encode_utf16().flat_map(u16::to_le_bytes));
        assert_eq!(parse_distro_list(&decode_listing(&bytes)), vec!["Alpine"]);

        assert_eq!(
            parse_distro_list(&decode_listing(b"Ubuntu-22.04\r\n  \r\nkali-linux\n")),
            vec!["Ubuntu-22.04", "kali-linux"]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_is_no_distros() {
        let ctx = windows_context(FakeLister::failing(), MockFileSystem::new());
        let discoverer = WslDiscoverer::new(ctx);

        assert!(discoverer.list_distros().await.is_empty());
        assert!(discoverer.discover_instances().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_command_is_no_distros() {
        let lister = WslCommand::new(
            "ccenv-no-such-binary",
            vec!["--list".to_string()],
            Duration::from_secs(1),
        );
        assert!(lister.list_distros_raw().await.is_err());
    }

    fn command_context(command: WslCommand) -> Context {
        Context::new(
            Environment::new(EnvironmentKind::Windows, r"C:\Users\u"),
            DiscoveryOptions::default(),
            Arc::new(MockFileSystem::new()),
            Arc::new(command),
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_command_times_out() {
        let command = WslCommand::new(
            "sleep",
            vec!["10".to_string()],
            Duration::from_millis(200),
        );

        let started = std::time::Instant::now();
        let err = command.list_distros_raw().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));

        let discoverer = WslDiscoverer::new(command_context(command));
        assert!(discoverer.list_distros().await.is_empty());
        assert!(discoverer.discover_instances().await.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_is_no_distros() {
        let command = WslCommand::new("false", Vec::new(), Duration::from_secs(5));
        assert!(command.list_distros_raw().await.is_err());

        let discoverer = WslDiscoverer::new(command_context(command));
        assert!(discoverer.list_distros().await.is_empty());
    }

    #[tokio::test]
    async fn test_modern_hit_skips_legacy() {
        let (fs, probed) = fake_tree(
            &[(r"\\wsl.localhost\Ubuntu\home", vec![".cache", "alice", "bob"])],
            &[
                r"\\wsl.localhost\Ubuntu\home\alice\.claude.json",
                r"\\wsl.localhost\Ubuntu\home\bob\.claude.json",
            ],
        );
        let lister = FakeLister::with_output("Ubuntu\r\n");
        let discoverer = WslDiscoverer::new(windows_context(lister, fs));

        let instances = discoverer.discover_instances().await;
        assert_eq!(
            instances,
            vec![DiscoveredWslInstance {
                distro_name: "Ubuntu".to_string(),
                config_path: r"\\wsl.localhost\Ubuntu\home\alice\.claude.json".to_string(),
                use_legacy_format: false,
            }]
        );
        assert!(probed.lock().unwrap().iter().all(|p| !p.starts_with(r"\\wsl$")));
    }

    #[tokio::test]
    async fn test_legacy_fallback_is_global() {
        // Debian is only reachable through the legacy root
        let (fs, probed) = fake_tree(
            &[(r"\\wsl$\Debian\home", vec!["carol"])],
            &[r"\\wsl$\Debian\home\carol\.claude.json"],
        );
        let lister = FakeLister::with_output("Ubuntu\r\nDebian\r\n");
        let discoverer = WslDiscoverer::new(windows_context(lister, fs));

        let instances = discoverer.discover_instances().await;
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].distro_name, "Debian");
        assert!(instances[0].use_legacy_format);

        let probed = probed.lock().unwrap();
        for root in [
            r"\\wsl.localhost\Ubuntu\home",
            r"\\wsl.localhost\Debian\home",
            r"\\wsl$\Ubuntu\home",
            r"\\wsl$\Debian\home",
        ] {
            assert!(probed.iter().any(|p| p == root), "{root} not probed");
        }
    }

    #[tokio::test]
    async fn test_no_mixing_when_one_modern_hit() {
        // Debian would be found under legacy, but Ubuntu already hit under modern
        let (fs, _) = fake_tree(
            &[
                (r"\\wsl.localhost\Ubuntu\home", vec!["alice"]),
                (r"\\wsl$\Debian\home", vec!["carol"]),
            ],
            &[
                r"\\wsl.localhost\Ubuntu\home\alice\.claude.json",
                r"\\wsl$\Debian\home\carol\.claude.json",
            ],
        );
        let lister = FakeLister::with_output("Ubuntu\r\nDebian\r\n");
        let discoverer = WslDiscoverer::new(windows_context(lister, fs));

        let instances = discoverer.discover_instances().await;
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].distro_name, "Ubuntu");
    }

    #[tokio::test]
    async fn test_discover_facades_translate_paths() {
        let (fs, _) = fake_tree(
            &[(r"\\wsl.localhost\Ubuntu\home", vec!["u"])],
            &[r"\\wsl.localhost\Ubuntu\home\u\.claude.json"],
        );
        let lister = FakeLister::with_output("Ubuntu\r\n");
        let discoverer = WslDiscoverer::new(windows_context(lister, fs));

        let facades = discoverer.discover_facades().await;
        assert_eq!(facades.len(), 1);

        let projects = facades[0].get_projects().await;
        assert_eq!(projects[0].path, r"\\wsl.localhost\Ubuntu\home\u\app");
    }
}
