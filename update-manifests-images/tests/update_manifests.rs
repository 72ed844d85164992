use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tempfile::TempDir;
use update_manifests_images::{
    APPLICATIONS, Application, ImageTarget, ManifestError, update_manifests_images,
};

const KUSTOMIZATION: &str = r#"apiVersion: kustomize.config.k8s.io/v1beta1
kind: Kustomization
resources:
- deployment.yaml
images:
- name: ghcr.io/kubeflow/kubeflow/volumes-web-app
  newName: ghcr.io/kubeflow/kubeflow/volumes-web-app
  newTag: v1.7.0
"#;

fn write_kustomization(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read_images(root: &Path, relative: &str) -> Vec<Value> {
    let content = fs::read_to_string(root.join(relative)).unwrap();
    let document: Value = serde_yaml::from_str(&content).unwrap();
    document["images"].as_sequence().unwrap().clone()
}

#[test]
fn every_application_is_pinned_to_the_tag() {
    // Arrange
    let root = TempDir::new().unwrap();
    for application in APPLICATIONS {
        write_kustomization(root.path(), application.kustomization, KUSTOMIZATION);
    }

    // Act
    update_manifests_images(root.path(), "v1.8.0", APPLICATIONS).unwrap();

    // Assert
    for application in APPLICATIONS {
        let images = read_images(root.path(), application.kustomization);
        for target in application.images {
            let entry = images
                .iter()
                .find(|entry| entry["name"] == target.name)
                .unwrap();
            assert_eq!(entry["newName"], target.new_name);
            assert_eq!(entry["newTag"], "v1.8.0");
        }
    }

    let volumes = APPLICATIONS
        .iter()
        .find(|application| application.name == "Volumes Web App")
        .unwrap();
    assert_eq!(read_images(root.path(), volumes.kustomization).len(), 1);

    let tensorboards = APPLICATIONS
        .iter()
        .find(|application| application.name == "Tensorboards Web App")
        .unwrap();
    assert_eq!(read_images(root.path(), tensorboards.kustomization).len(), 2);
}

#[test]
fn unrelated_fields_survive_the_rewrite() {
    // Arrange
    let root = TempDir::new().unwrap();
    let application = Application {
        name: "Volumes Web App",
        kustomization: "volumes/kustomization.yaml",
        images: &[ImageTarget {
            name: "ghcr.io/kubeflow/kubeflow/volumes-web-app",
            new_name: "registry.local/volumes-web-app",
        }],
    };
    write_kustomization(root.path(), application.kustomization, KUSTOMIZATION);

    // Act
    update_manifests_images(root.path(), "v1.8.0", &[application]).unwrap();

    // Assert
    let content = fs::read_to_string(root.path().join(application.kustomization)).unwrap();
    let document: Value = serde_yaml::from_str(&content).unwrap();
    assert_eq!(document["kind"], "Kustomization");
    assert_eq!(document["resources"][0], "deployment.yaml");
    assert_eq!(document["images"][0]["newName"], "registry.local/volumes-web-app");
    assert_eq!(document["images"][0]["newTag"], "v1.8.0");
}

#[test]
fn missing_kustomization_is_reported_with_its_path() {
    // Arrange
    let root = TempDir::new().unwrap();

    // Act
    let err = update_manifests_images(root.path(), "v1.8.0", APPLICATIONS).unwrap_err();

    // Assert
    match err {
        ManifestError::Read { path, .. } => {
            assert!(path.ends_with(APPLICATIONS[0].kustomization));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_mapping_kustomization_is_rejected() {
    // Arrange
    let root = TempDir::new().unwrap();
    let application = APPLICATIONS[0];
    write_kustomization(root.path(), application.kustomization, "- not\n- a mapping\n");

    // Act
    let err = update_manifests_images(root.path(), "v1.8.0", &[application]).unwrap_err();

    // Assert
    assert!(matches!(err, ManifestError::Kustomization { .. }));
}
