//! `odo init` runner using cliclack

use crate::devfile::{dir_is_empty, directory_contains_devfile, DevfileObj, DEVFILE_NAME};
use crate::init::{DevfileLocation, InitClient, InitFlags, PromptAsker};
use crate::preference::Preference;
use crate::registry::{extract_starter_project, HttpRegistryClient, StarterFiles};
use crate::USER_AGENT;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::terminal::TerminalPrompter;

type TerminalInitClient = InitClient<PromptAsker<TerminalPrompter>, HttpRegistryClient>;

/// CLI arguments for the init command
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    pub flags: InitFlags,

    /// Component directory, the current directory when unset
    pub directory: Option<PathBuf>,
}

/// How far the workflow went, to decide what to clean up on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Started,
    DevfileDownloaded,
    StarterDownloaded,
}

/// Bootstrap a component in the target directory
pub async fn run_init(args: InitArgs) -> Result<()> {
    let dir = match args.directory {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get the current directory")?,
    };

    cliclack::intro("odo init")?;

    if directory_contains_devfile(&dir)? {
        anyhow::bail!("a devfile already exists in the current directory");
    }

    let preference = Preference::load()?;
    let registry = HttpRegistryClient::new(preference.registries().to_vec(), USER_AGENT);
    let mut client = InitClient::new(PromptAsker::new(TerminalPrompter), registry);
    client.validate(&args.flags, &dir)?;

    if args.flags.is_empty() {
        if dir_is_empty(&dir)? {
            cliclack::log::info("The current directory is empty. odo will help you start a new project.")?;
        } else {
            cliclack::log::info("The current directory already contains source code.")?;
        }
        cliclack::log::info("Interactive mode enabled, please answer the following questions:")?;
    }

    let mut progress = Progress::Started;
    let devfile = match init_component(&mut client, &args.flags, &dir, &mut progress).await {
        Ok(devfile) => devfile,
        Err(e) => {
            let note = cleanup(&dir, progress);
            return Err(match note {
                Some(note) => e.context(note),
                None => e,
            });
        }
    };

    cliclack::outro(final_message(
        devfile.metadata_name(),
        devfile.has_deploy_command(),
    ))?;
    Ok(())
}

async fn init_component(
    client: &mut TerminalInitClient,
    flags: &InitFlags,
    dir: &Path,
    progress: &mut Progress,
) -> Result<DevfileObj> {
    let location = client.select_devfile(flags).await?;

    let spinner = cliclack::spinner();
    spinner.start("Downloading devfile...");
    let path = match client.download_devfile(&location, dir).await {
        Ok(path) => path,
        Err(e) => {
            spinner.error("Unable to download devfile");
            return Err(e.context("unable to download devfile"));
        }
    };
    *progress = Progress::DevfileDownloaded;
    spinner.stop(describe_location(&location));

    let mut devfile = DevfileObj::parse_file(&path).context("unable to parse devfile")?;
    client
        .personalize_devfile_config(&mut devfile, flags)
        .context("failed to configure devfile")?;
    devfile.write()?;

    if let Some(starter) = client.select_starter_project(&devfile, flags)? {
        let spinner = cliclack::spinner();
        spinner.start(format!("Downloading starter project {:?}...", starter.name));
        let archive = match client.fetch_starter_project(&starter, &location).await {
            Ok(archive) => archive,
            Err(e) => {
                spinner.error("Unable to download starter project");
                return Err(e.context(format!("unable to download starter project {:?}", starter.name)));
            }
        };

        // From here on the directory may hold starter files, even partially
        *progress = Progress::StarterDownloaded;
        let extracted = match extract_starter_project(&archive, dir, starter.sub_dir.as_deref()) {
            Ok(extracted) => extracted,
            Err(e) => {
                spinner.error("Unable to extract starter project");
                return Err(e.context(format!("unable to extract starter project {:?}", starter.name)));
            }
        };
        spinner.stop(format!(
            "Downloaded starter project {:?} ({} files)",
            starter.name,
            extracted.files.len()
        ));

        if let Some(warning) = starter_warning(&extracted) {
            cliclack::log::warning(warning)?;
        }

        // The starter project may ship its own devfile
        if extracted.contains_devfile() && !extracted.set_aside() {
            devfile = DevfileObj::parse_file(&path).context("unable to parse devfile")?;
        }
    }

    client
        .personalize_name(&mut devfile, flags)
        .context("Failed to update the devfile's name")?;
    devfile.write()?;

    Ok(devfile)
}

fn describe_location(location: &DevfileLocation) -> String {
    match (&location.devfile_path, &location.devfile, &location.devfile_registry) {
        (Some(path), _, _) => format!("Downloaded devfile from {:?}", path),
        (None, Some(name), Some(registry)) => {
            format!("Downloaded devfile {:?} from registry {:?}", name, registry)
        }
        (None, Some(name), None) => format!("Downloaded devfile {:?}", name),
        (None, None, _) => "Downloaded devfile".to_string(),
    }
}

fn starter_warning(extracted: &StarterFiles) -> Option<String> {
    let conflicts = extracted
        .conflicts
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if extracted.set_aside() {
        Some(format!(
            "There are conflicting files ({}) between starter project and the current directory, hence the starter project has been copied to {}",
            conflicts,
            extracted.root.display()
        ))
    } else if extracted.contains_devfile() && !extracted.conflicts.is_empty() {
        Some(format!(
            "A devfile is present inside the starter project; its files ({}) replaced those of the current directory",
            conflicts
        ))
    } else {
        None
    }
}

/// Undo what can safely be undone, returning a note for the user
fn cleanup(dir: &Path, progress: Progress) -> Option<&'static str> {
    match progress {
        Progress::Started => None,
        Progress::DevfileDownloaded => {
            if let Err(e) = std::fs::remove_file(dir.join(DEVFILE_NAME)) {
                tracing::debug!("unable to remove the devfile: {}", e);
            }
            Some("the command failed, the devfile has been removed from current directory")
        }
        Progress::StarterDownloaded => Some(
            "the command failed after downloading the starter project. By security, the directory is not cleaned up",
        ),
    }
}

fn final_message(name: &str, has_deploy: bool) -> String {
    let mut message = format!(
        "Your new component {:?} is ready in the current directory.\n\
         To start editing your component, use \"odo dev\" and open this folder in your favorite IDE.\n\
         Changes will be directly reflected on the cluster.",
        name
    );
    if has_deploy {
        message.push_str("\nTo deploy your component to a cluster use \"odo deploy\".");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_message_mentions_deploy_when_available() {
        assert!(!final_message("my-app", false).contains("odo deploy"));
        let message = final_message("my-app", true);
        assert!(message.starts_with("Your new component \"my-app\" is ready"));
        assert!(message.ends_with("use \"odo deploy\"."));
    }

    #[test]
    fn test_cleanup_removes_devfile_before_starter_download() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEVFILE_NAME), "schemaVersion: 2.2.0").unwrap();

        assert!(cleanup(dir.path(), Progress::Started).is_none());
        assert!(dir.path().join(DEVFILE_NAME).exists());

        let note = cleanup(dir.path(), Progress::StarterDownloaded).unwrap();
        assert!(note.contains("not cleaned up"));
        assert!(dir.path().join(DEVFILE_NAME).exists());

        let note = cleanup(dir.path(), Progress::DevfileDownloaded).unwrap();
        assert!(note.contains("has been removed"));
        assert!(!dir.path().join(DEVFILE_NAME).exists());
    }

    #[test]
    fn test_failed_extraction_keeps_partial_starter_files() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEVFILE_NAME), "schemaVersion: 2.2.0").unwrap();

        // `app` is written as a file, then needed as a folder
        let mut archive = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut archive));
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("app", options).unwrap();
            zip.write_all(b"first").unwrap();
            zip.start_file("app/main.go", options).unwrap();
            zip.write_all(b"package main").unwrap();
            zip.finish().unwrap();
        }

        assert!(extract_starter_project(&archive, dir.path(), None).is_err());
        assert!(dir.path().join("app").is_file());

        let note = cleanup(dir.path(), Progress::StarterDownloaded).unwrap();
        assert!(note.contains("not cleaned up"));
        assert!(dir.path().join(DEVFILE_NAME).exists());
        assert!(dir.path().join("app").exists());
    }

    #[test]
    fn test_starter_warning_lists_conflicts() {
        let dir = PathBuf::from("/work");
        let set_aside = StarterFiles {
            root: dir.join(crate::registry::CONFLICT_DIR_NAME),
            files: vec![PathBuf::from("main.go"), PathBuf::from("go.mod")],
            conflicts: vec![PathBuf::from("main.go")],
        };
        let warning = starter_warning(&set_aside).unwrap();
        assert!(warning.contains("(main.go)"));
        assert!(warning.ends_with("CONFLICT_STARTER_PROJECT"));

        let replaced = StarterFiles {
            root: dir.clone(),
            files: vec![PathBuf::from(DEVFILE_NAME), PathBuf::from("main.go")],
            conflicts: vec![PathBuf::from("main.go")],
        };
        assert!(starter_warning(&replaced).unwrap().starts_with("A devfile is present"));

        let clean = StarterFiles {
            root: dir,
            files: vec![PathBuf::from("main.go")],
            conflicts: Vec::new(),
        };
        assert!(starter_warning(&clean).is_none());
    }

    #[test]
    fn test_describe_location() {
        let location = DevfileLocation {
            devfile: Some("nodejs".into()),
            devfile_registry: Some("DefaultDevfileRegistry".into()),
            ..Default::default()
        };
        assert_eq!(
            describe_location(&location),
            "Downloaded devfile \"nodejs\" from registry \"DefaultDevfileRegistry\""
        );
    }
}
