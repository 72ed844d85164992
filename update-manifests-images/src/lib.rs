//! Rewrites the image tags of the Kustomize manifests of every component
//! during a release.
//!
//! The documents are re-serialized, so comments and quoting style of the
//! edited files are not preserved.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::info;

/// An image reference to pin in a kustomization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTarget {
    /// Image name as referenced by the manifests, used to find the entry.
    pub name: &'static str,
    pub new_name: &'static str,
}

/// A component whose manifests reference released images.
#[derive(Debug, Clone, Copy)]
pub struct Application {
    pub name: &'static str,
    /// Path of the kustomization file, relative to the repository root.
    pub kustomization: &'static str,
    pub images: &'static [ImageTarget],
}

const fn same_name(name: &'static str) -> ImageTarget {
    ImageTarget {
        name,
        new_name: name,
    }
}

/// Every component released together.
pub const APPLICATIONS: &[Application] = &[
    Application {
        name: "Jupyter Web App",
        kustomization: "components/crud-web-apps/jupyter/manifests/base/kustomization.yaml",
        images: &[same_name("ghcr.io/kubeflow/notebooks/jupyter-web-app")],
    },
    Application {
        name: "Tensorboards Web App",
        kustomization: "components/crud-web-apps/tensorboards/manifests/base/kustomization.yaml",
        images: &[same_name("ghcr.io/kubeflow/kubeflow/tensorboards-web-app")],
    },
    Application {
        name: "Volumes Web App",
        kustomization: "components/crud-web-apps/volumes/manifests/base/kustomization.yaml",
        images: &[same_name("ghcr.io/kubeflow/kubeflow/volumes-web-app")],
    },
    Application {
        name: "Notebook Controller",
        kustomization: "components/notebook-controller/config/base/kustomization.yaml",
        images: &[same_name("ghcr.io/kubeflow/kubeflow/notebook-controller")],
    },
    Application {
        name: "PVC Viewer Controller",
        kustomization: "components/pvcviewer-controller/config/base/kustomization.yaml",
        images: &[same_name("ghcr.io/kubeflow/kubeflow/pvcviewer-controller")],
    },
    Application {
        name: "Tensorboard Controller",
        kustomization: "components/tensorboard-controller/config/base/kustomization.yaml",
        images: &[same_name("ghcr.io/kubeflow/kubeflow/tensorboard-controller")],
    },
];

#[derive(Debug, Error)]
pub enum KustomizationError {
    #[error("the kustomization is not a mapping")]
    NotAMapping,

    #[error("the images field is not a list")]
    ImagesNotAList,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid kustomization {path}: {source}")]
    Kustomization {
        path: PathBuf,
        source: KustomizationError,
    },
}

/// Pins `images` to `tag` in a parsed kustomization.
///
/// The entry whose `name` matches is updated in place, otherwise a new entry
/// is appended. Other entries and fields are left untouched.
pub fn update_kustomization(
    kustomization: &mut Mapping,
    images: &[ImageTarget],
    tag: &str,
) -> Result<(), KustomizationError> {
    let entries = kustomization
        .entry(Value::from("images"))
        .or_insert_with(|| Value::Sequence(Vec::new()));
    if entries.is_null() {
        *entries = Value::Sequence(Vec::new());
    }
    let Value::Sequence(entries) = entries else {
        return Err(KustomizationError::ImagesNotAList);
    };

    for target in images {
        let existing = entries
            .iter_mut()
            .filter_map(Value::as_mapping_mut)
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(target.name));

        match existing {
            Some(entry) => {
                entry.insert(Value::from("newName"), Value::from(target.new_name));
                entry.insert(Value::from("newTag"), Value::from(tag));
            }
            None => {
                let mut entry = Mapping::new();
                entry.insert(Value::from("name"), Value::from(target.name));
                entry.insert(Value::from("newName"), Value::from(target.new_name));
                entry.insert(Value::from("newTag"), Value::from(tag));
                entries.push(Value::Mapping(entry));
            }
        }
    }

    Ok(())
}

/// Loads, updates and writes back the kustomization of one application.
pub fn update_application(root: &Path, application: &Application, tag: &str) -> Result<(), ManifestError> {
    let path = root.join(application.kustomization);
    info!(app = application.name, path = %path.display(), "updating manifests");

    let content = fs::read_to_string(&path).map_err(|source| ManifestError::Read {
        path: path.clone(),
        source,
    })?;
    let mut document: Value =
        serde_yaml::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.clone(),
            source,
        })?;

    document
        .as_mapping_mut()
        .ok_or(KustomizationError::NotAMapping)
        .and_then(|kustomization| update_kustomization(kustomization, application.images, tag))
        .map_err(|source| ManifestError::Kustomization {
            path: path.clone(),
            source,
        })?;

    let content = serde_yaml::to_string(&document).map_err(|source| ManifestError::Serialize {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, content).map_err(|source| ManifestError::Write { path, source })?;

    Ok(())
}

/// Pins the images of every application under `root` to `tag`.
///
/// Stops at the first application that fails; the files of the applications
/// before it are already written.
pub fn update_manifests_images(
    root: &Path,
    tag: &str,
    applications: &[Application],
) -> Result<(), ManifestError> {
    for application in applications {
        update_application(root, application, tag)?;
    }

    info!(tag, count = applications.len(), "updated manifests images");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: ImageTarget = same_name("ghcr.io/kubeflow/kubeflow/volumes-web-app");

    fn parse(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn matching_entry_is_updated_in_place() {
        let mut kustomization = parse(
            r#"
images:
- name: busybox
  newTag: "1.36"
- name: ghcr.io/kubeflow/kubeflow/volumes-web-app
  newName: registry.local/volumes-web-app
  newTag: v1.7.0
"#,
        );

        update_kustomization(&mut kustomization, &[TARGET], "v1.8.0").unwrap();

        let expected = parse(
            r#"
images:
- name: busybox
  newTag: "1.36"
- name: ghcr.io/kubeflow/kubeflow/volumes-web-app
  newName: ghcr.io/kubeflow/kubeflow/volumes-web-app
  newTag: v1.8.0
"#,
        );
        assert_eq!(kustomization, expected);
    }

    #[test]
    fn missing_entry_is_appended() {
        let mut kustomization = parse(
            r#"
resources:
- deployment.yaml
images:
- name: busybox
  newTag: "1.36"
"#,
        );

        update_kustomization(&mut kustomization, &[TARGET], "v1.8.0").unwrap();

        let images = kustomization["images"].as_sequence().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["name"], "busybox");
        assert_eq!(images[1]["name"], TARGET.name);
        assert_eq!(images[1]["newName"], TARGET.new_name);
        assert_eq!(images[1]["newTag"], "v1.8.0");
        assert_eq!(kustomization["resources"][0], "deployment.yaml");
    }

    #[test]
    fn images_field_is_created_when_absent() {
        let mut kustomization = parse("resources:\n- deployment.yaml\n");

        update_kustomization(&mut kustomization, &[TARGET], "v1.8.0").unwrap();

        assert_eq!(kustomization["images"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn non_list_images_field_is_rejected() {
        let mut kustomization = parse("images: busybox\n");

        let err = update_kustomization(&mut kustomization, &[TARGET], "v1.8.0").unwrap_err();

        assert!(matches!(err, KustomizationError::ImagesNotAList));
    }

    #[test]
    fn every_application_pins_its_own_image() {
        assert_eq!(APPLICATIONS.len(), 6);
        for application in APPLICATIONS {
            assert!(application.kustomization.ends_with("kustomization.yaml"));
            for image in application.images {
                assert_eq!(image.name, image.new_name);
            }
        }
    }
}
