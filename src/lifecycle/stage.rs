//! One-time, process-wide staging of the native modules.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use anyhow::{Context, anyhow, bail};
use libloading::{Library, Symbol};
use tempfile::TempDir;

use crate::config::StageConfig;
use crate::logging::{debug, info};
use crate::{Error, Result};

/// Bundled modules copied into a private temporary directory.
#[derive(Debug)]
pub struct StagedModules {
    dir: TempDir,
    modules: Vec<(String, PathBuf)>,
}

impl StagedModules {
    /// Directory holding the copies.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the staged copy of `name`.
    pub fn path(&self, name: &str) -> Option<&Path> {
        self.modules
            .iter()
            .find(|(module, _)| module == name)
            .map(|(_, path)| path.as_path())
    }

    /// All staged modules in copy order.
    pub fn modules(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.modules
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }
}

/// Registers the staged automation module with the platform loader.
pub trait Registrar: Send + Sync {
    fn register(&self, staged: &StagedModules, config: &StageConfig) -> anyhow::Result<()>;
}

/// Registers the automation module by calling the registration entry point
/// exported by the bundled registrar module.
///
/// Every module it loads stays loaded for as long as the registrar lives.
#[derive(Debug, Default)]
pub struct DllRegistrar {
    loaded: Mutex<Vec<Library>>,
}

type RegisterFn = unsafe extern "system" fn(*const c_char, c_int) -> c_int;

impl DllRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(&self, path: &Path) -> anyhow::Result<()> {
        // SAFETY: the module comes from the application's own bundle; its
        // initialization routines are trusted.
        let library = unsafe { Library::new(path) }
            .with_context(|| format!("Failed to load module {}", path.display()))?;
        self.loaded
            .lock()
            .map_err(|_| anyhow!("Loaded module table poisoned"))?
            .push(library);
        Ok(())
    }
}

impl Registrar for DllRegistrar {
    fn register(&self, staged: &StagedModules, config: &StageConfig) -> anyhow::Result<()> {
        for name in &config.loader_modules {
            let path = staged
                .path(name)
                .ok_or_else(|| anyhow!("Loader module {} was not staged", name))?;
            self.load(path)?;
        }

        let registrar_path = staged
            .path(&config.registrar_module)
            .ok_or_else(|| anyhow!("Registrar module {} was not staged", config.registrar_module))?;
        let automation_path = staged
            .path(&config.automation_module)
            .ok_or_else(|| anyhow!("Automation module {} was not staged", config.automation_module))?;
        let automation_path = CString::new(automation_path.to_string_lossy().as_bytes())
            .context("Automation module path contains a NUL byte")?;

        // SAFETY: the library is trusted (see `load`) and the symbol has the
        // documented `int SetDllPathA(const char*, int)` signature.
        let status = unsafe {
            let library = Library::new(registrar_path).with_context(|| {
                format!("Failed to load registrar {}", registrar_path.display())
            })?;
            let status = {
                let register: Symbol<'_, RegisterFn> = library
                    .get(config.register_symbol.as_bytes())
                    .with_context(|| format!("Symbol {} not found", config.register_symbol))?;
                register(automation_path.as_ptr(), config.apartment.mode())
            };
            self.loaded
                .lock()
                .map_err(|_| anyhow!("Loaded module table poisoned"))?
                .push(library);
            status
        };

        if status == 0 {
            bail!(
                "{} rejected {}",
                config.register_symbol,
                automation_path.to_string_lossy()
            );
        }
        Ok(())
    }
}

/// The one-time native stage shared by every handle in the process.
///
/// [`ensure`](ProcessStage::ensure) copies the bundled modules into a fresh
/// temporary directory and registers the automation module. It runs exactly
/// once no matter how many threads race to call it; later callers observe
/// the cached outcome. A failed stage stays failed.
pub struct ProcessStage {
    config: StageConfig,
    registrar: Box<dyn Registrar>,
    outcome: OnceLock<std::result::Result<StagedModules, String>>,
}

impl ProcessStage {
    /// Stage with the default [`DllRegistrar`].
    pub fn new(config: StageConfig) -> Self {
        Self::with_registrar(config, DllRegistrar::new())
    }

    pub fn with_registrar(config: StageConfig, registrar: impl Registrar + 'static) -> Self {
        Self {
            config,
            registrar: Box::new(registrar),
            outcome: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Run the stage if it has not run yet.
    pub fn ensure(&self) -> Result<&StagedModules> {
        self.outcome
            .get_or_init(|| self.run().map_err(|e| format!("{:#}", e)))
            .as_ref()
            .map_err(|msg| Error::StageInitFailed(msg.clone()))
    }

    /// Whether the stage has completed successfully.
    pub fn is_ready(&self) -> bool {
        matches!(self.outcome.get(), Some(Ok(_)))
    }

    fn run(&self) -> anyhow::Result<StagedModules> {
        let dir = tempfile::Builder::new()
            .prefix(&self.config.temp_prefix)
            .tempdir()
            .context("Failed to create staging directory")?;

        let mut modules = Vec::new();
        for name in self.config.bundled_modules() {
            let source = self.config.bundle_dir.join(name);
            if !source.is_file() {
                bail!("Could not find bundled module: {}", source.display());
            }
            let target = dir.path().join(name);
            std::fs::copy(&source, &target).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), target.display())
            })?;
            debug!(module = name, path = %target.display(), "staged native module");
            modules.push((name.to_string(), target));
        }

        let staged = StagedModules { dir, modules };
        self.registrar.register(&staged, &self.config)?;
        info!(dir = %staged.dir().display(), "native stage complete");
        Ok(staged)
    }
}

impl std::fmt::Debug for ProcessStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessStage")
            .field("config", &self.config)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct CountingRegistrar {
        calls: Arc<AtomicUsize>,
    }

    impl Registrar for CountingRegistrar {
        fn register(&self, staged: &StagedModules, config: &StageConfig) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let path = staged
                .path(&config.automation_module)
                .ok_or_else(|| anyhow!("missing"))?;
            assert!(path.is_file());
            Ok(())
        }
    }

    fn bundle() -> (TempDir, StageConfig) {
        let bundle = tempfile::tempdir().unwrap();
        for name in ["DmReg.dll", "dm.dll", "loader.dll"] {
            std::fs::write(bundle.path().join(name), name.as_bytes()).unwrap();
        }
        let config = StageConfig {
            bundle_dir: bundle.path().to_path_buf(),
            loader_modules: vec!["loader.dll".to_string()],
            ..StageConfig::default()
        };
        (bundle, config)
    }

    #[test]
    fn test_stage_copies_modules() {
        let (_bundle, config) = bundle();
        let stage = ProcessStage::with_registrar(config, CountingRegistrar::default());
        let staged = stage.ensure().unwrap();

        let names: Vec<&str> = staged.modules().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["loader.dll", "DmReg.dll", "dm.dll"]);
        let copied = std::fs::read(staged.path("dm.dll").unwrap()).unwrap();
        assert_eq!(copied, b"dm.dll");
        assert!(stage.is_ready());
    }

    #[test]
    fn test_stage_runs_once_across_threads() {
        let (_bundle, config) = bundle();
        let registrar = CountingRegistrar::default();
        let calls = Arc::clone(&registrar.calls);
        let stage = Arc::new(ProcessStage::with_registrar(config, registrar));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let stage = Arc::clone(&stage);
                std::thread::spawn(move || stage.ensure().map(|s| s.dir().to_path_buf()).unwrap())
            })
            .collect();
        let dirs: Vec<PathBuf> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(dirs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_missing_module_fails_permanently() {
        let (bundle, config) = bundle();
        std::fs::remove_file(bundle.path().join("dm.dll")).unwrap();
        let registrar = CountingRegistrar::default();
        let calls = Arc::clone(&registrar.calls);
        let stage = ProcessStage::with_registrar(config, registrar);

        let first = stage.ensure().unwrap_err();
        assert!(first.is_stage_failure());
        assert!(first.to_string().contains("dm.dll"));

        // Restoring the file does not rerun a failed stage.
        std::fs::write(bundle.path().join("dm.dll"), b"dm").unwrap();
        assert!(stage.ensure().unwrap_err().is_stage_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!stage.is_ready());
    }

    #[test]
    fn test_registrar_failure_is_stage_failure() {
        struct Rejecting;
        impl Registrar for Rejecting {
            fn register(&self, _: &StagedModules, _: &StageConfig) -> anyhow::Result<()> {
                bail!("registration refused")
            }
        }

        let (_bundle, config) = bundle();
        let stage = ProcessStage::with_registrar(config, Rejecting);
        let err = stage.ensure().unwrap_err();
        assert!(matches!(err, Error::StageInitFailed(ref msg) if msg.contains("registration refused")));
    }

    #[test]
    fn test_dll_registrar_reports_unloadable_module() {
        let (_bundle, config) = bundle();
        let stage = ProcessStage::new(config);
        // The bundled files are not real modules, so loading must fail.
        assert!(stage.ensure().unwrap_err().is_stage_failure());
    }
}
