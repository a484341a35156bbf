use anyhow::{bail, Context, Error};
use log::info;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs the R script that converts a Seurat `.rds` object into an h5ad file and a dropdown column list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RdsConverter {
    pub rscript: PathBuf,
    pub script: PathBuf,
}

impl RdsConverter {
    pub fn new(rscript: impl Into<PathBuf>, script: impl Into<PathBuf>) -> RdsConverter {
        RdsConverter {
            rscript: rscript.into(),
            script: script.into(),
        }
    }

    /// Run `<rscript> <script> --input <input>` and wait for it to exit.
    pub fn run(&self, input: &Path) -> Result<(), Error> {
        info!(
            "running {} {} --input {}",
            self.rscript.display(),
            self.script.display(),
            input.display()
        );
        let status = Command::new(&self.rscript)
            .arg(&self.script)
            .arg("--input")
            .arg(input)
            .spawn()
            .with_context(|| format!("failed to start {}", self.rscript.display()))?
            .wait()?;
        if !status.success() {
            bail!(
                "conversion of {} failed: `{} {}` exited with {status}",
                input.display(),
                self.rscript.display(),
                self.script.display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_interpreter() {
        let converter = RdsConverter::new("/nonexistent/bin/Rscript", "convert.R");
        let err = converter.run(Path::new("obj.rds")).unwrap_err();
        assert!(err.to_string().contains("failed to start"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_script_arguments_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("convert.sh");
        let args_out = dir.path().join("args.txt");
        std::fs::write(
            &script,
            format!("echo \"$@\" > {}\ntest \"$2\" = good.rds\n", args_out.display()),
        )
        .unwrap();

        let converter = RdsConverter::new("sh", &script);
        converter.run(Path::new("good.rds")).unwrap();
        assert_eq!(std::fs::read_to_string(&args_out).unwrap().trim(), "--input good.rds");

        let err = converter.run(Path::new("bad.rds")).unwrap_err();
        assert!(err.to_string().contains("conversion of bad.rds failed"), "{err}");
    }
}
