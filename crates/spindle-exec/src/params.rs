//! Launch parameters for one external process.

use std::collections::HashMap;
use std::path::PathBuf;

/// Everything needed to launch one process.
///
/// The command is an ordered argv token sequence and must be non-empty by
/// launch time. When `environment` is set it *replaces* the inherited
/// environment wholesale rather than merging into it. A redirect path routes
/// that stream to a file at launch; the stream then gets no pipe and no relay,
/// and `ExecResult` carries no text for it.
#[derive(Debug, Clone, Default)]
pub struct ProcessParams {
    pub command: Vec<String>,
    pub directory: Option<PathBuf>,
    pub environment: Option<HashMap<String, String>>,
    pub redirect_stdin: Option<PathBuf>,
    pub redirect_stdout: Option<PathBuf>,
    pub redirect_stderr: Option<PathBuf>,
}

impl ProcessParams {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            command: vec![program.into()],
            ..Self::default()
        }
    }

    /// Params that run `script` through the platform shell.
    pub fn shell(script: impl Into<String>) -> Self {
        let script = script.into();
        let command = if cfg!(target_os = "windows") {
            vec!["cmd".to_string(), "/C".to_string(), script]
        } else {
            vec!["sh".to_string(), "-c".to_string(), script]
        };
        Self {
            command,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.command.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    /// Add one variable to the replacement environment.
    ///
    /// The first call switches the child from the inherited environment to an
    /// empty replacement map; inherited variables the child still needs must
    /// be added explicitly.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the entire replacement environment at once.
    #[must_use]
    pub fn environment(mut self, env: HashMap<String, String>) -> Self {
        self.environment = Some(env);
        self
    }

    #[must_use]
    pub fn redirect_stdin(mut self, path: impl Into<PathBuf>) -> Self {
        self.redirect_stdin = Some(path.into());
        self
    }

    #[must_use]
    pub fn redirect_stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.redirect_stdout = Some(path.into());
        self
    }

    #[must_use]
    pub fn redirect_stderr(mut self, path: impl Into<PathBuf>) -> Self {
        self.redirect_stderr = Some(path.into());
        self
    }

    /// argv[0], if any. Used for diagnostics and error messages.
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }
}
