// ABOUTME: Integration tests for configuration parsing and deploy config resolution.
// ABOUTME: Covers discovery, env references, placeholders, and validation before any I/O.

use skylift::config::{
    BUCKET_ENV, Config, DISTRIBUTION_ENV, DeployConfig, EnvValue, REGION_ENV, ReleaseOverrides,
    RunFlags, init_config,
};
use skylift::error::{Error, ErrorClass};
use std::fs;
use std::time::Duration;

const RELEASE_VARS: [&str; 3] = [BUCKET_ENV, DISTRIBUTION_ENV, REGION_ENV];

fn project_with_build_dir() -> tempfile::TempDir {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("site/dist")).unwrap();
    temp
}

mod parsing {
    use super::*;

    #[test]
    fn full_file_parses() {
        let yaml = r#"
region: eu-west-1
bucket:
  env: MY_BUCKET
distribution_id: E123
build_dir: public
upload_concurrency: 8
infra:
  dir: terraform
  engine: terraform
  plan_file: release.plan
  required_files: [main.tf]
health:
  urls:
    - https://example.com
    - env: STAGING_URL
  timeout: 2s
  content_markers: ["<title>", "Welcome"]
  concurrency: 2
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.region, EnvValue::Literal("eu-west-1".to_string()));
        assert_eq!(config.bucket, EnvValue::from_env("MY_BUCKET"));
        assert_eq!(config.upload_concurrency, 8);
        assert_eq!(config.infra.engine, "terraform");
        assert_eq!(config.infra.plan_file, "release.plan");
        assert_eq!(config.infra.required_files.len(), 1);
        assert_eq!(config.health.timeout, Duration::from_secs(2));
        assert_eq!(config.health.concurrency, 2);
        assert_eq!(config.health.content_markers.len(), 2);
    }

    #[test]
    fn empty_required_files_rejected() {
        let yaml = "infra:\n  required_files: []\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn defaults_when_file_is_missing() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::discover(temp.path()).unwrap();
        assert_eq!(config.infra.engine, "tofu");
        assert_eq!(config.infra.plan_file, "tfplan");
        assert_eq!(config.health.timeout, Duration::from_secs(10));
        assert_eq!(config.upload_concurrency, 4);
        assert_eq!(config.infra_dir(temp.path()), temp.path().join("infra"));
    }

    #[test]
    fn discovers_alternate_locations() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join(".skylift")).unwrap();
        fs::write(
            temp.path().join(".skylift/config.yml"),
            "upload_concurrency: 9\n",
        )
        .unwrap();
        assert_eq!(Config::discover(temp.path()).unwrap().upload_concurrency, 9);

        fs::write(temp.path().join("skylift.yaml"), "upload_concurrency: 7\n").unwrap();
        assert_eq!(Config::discover(temp.path()).unwrap().upload_concurrency, 7);
    }

    #[test]
    fn health_targets_skip_unset_urls() {
        temp_env::with_vars(
            [("SITE_URL", Some("https://example.com")), ("S3_URL", None)],
            || {
                let config = Config::default();
                assert_eq!(config.health.target_urls(), vec!["https://example.com"]);
            },
        );
    }
}

mod resolution {
    use super::*;

    #[test]
    fn reports_all_missing_values_at_once() {
        let temp = project_with_build_dir();
        temp_env::with_vars_unset(RELEASE_VARS, || {
            let err = DeployConfig::resolve(
                &Config::default(),
                temp.path(),
                None,
                RunFlags::default(),
            )
            .unwrap_err();

            match &err {
                Error::MissingConfiguration(names) => {
                    assert_eq!(names, &vec![BUCKET_ENV.to_string(), DISTRIBUTION_ENV.to_string()]);
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(err.class(), ErrorClass::Configuration);
        });
    }

    #[test]
    fn placeholder_bucket_counts_as_missing() {
        let temp = project_with_build_dir();
        temp_env::with_vars(
            [
                (BUCKET_ENV, Some("{{PROJECT_NAME}}-site-bucket")),
                (DISTRIBUTION_ENV, Some("E123")),
                (REGION_ENV, None),
            ],
            || {
                let err = DeployConfig::resolve(
                    &Config::default(),
                    temp.path(),
                    None,
                    RunFlags::default(),
                )
                .unwrap_err();
                assert!(err.to_string().contains(BUCKET_ENV));
                assert!(!err.to_string().contains(DISTRIBUTION_ENV));
            },
        );
    }

    #[test]
    fn resolves_from_environment() {
        let temp = project_with_build_dir();
        temp_env::with_vars(
            [
                (BUCKET_ENV, Some("demo-site-bucket")),
                (DISTRIBUTION_ENV, Some("E123")),
                (REGION_ENV, None),
            ],
            || {
                let deploy = DeployConfig::resolve(
                    &Config::default(),
                    temp.path(),
                    None,
                    RunFlags {
                        dry_run: true,
                        verbose: false,
                    },
                )
                .unwrap();
                assert_eq!(deploy.bucket().as_str(), "demo-site-bucket");
                assert_eq!(deploy.distribution_id().as_str(), "E123");
                assert_eq!(deploy.region(), "us-east-1");
                assert_eq!(deploy.build_dir(), temp.path().join("site/dist"));
                assert!(deploy.dry_run());
            },
        );
    }

    #[test]
    fn overrides_take_precedence() {
        let temp = project_with_build_dir();
        temp_env::with_vars(
            [
                (BUCKET_ENV, Some("env-bucket")),
                (DISTRIBUTION_ENV, Some("EENV")),
                (REGION_ENV, None),
            ],
            || {
                let overrides = ReleaseOverrides {
                    bucket: Some("infra-bucket".to_string()),
                    distribution_id: None,
                };
                let deploy = DeployConfig::resolve(
                    &Config::default(),
                    temp.path(),
                    Some(&overrides),
                    RunFlags::default(),
                )
                .unwrap();
                assert_eq!(deploy.bucket().as_str(), "infra-bucket");
                assert_eq!(deploy.distribution_id().as_str(), "EENV");
            },
        );
    }

    #[test]
    fn padded_infra_distribution_id_is_trimmed() {
        let temp = project_with_build_dir();
        temp_env::with_vars(
            [
                (BUCKET_ENV, Some("env-bucket")),
                (DISTRIBUTION_ENV, None::<&str>),
                (REGION_ENV, None),
            ],
            || {
                let overrides = ReleaseOverrides {
                    bucket: None,
                    distribution_id: Some("  E2ABC123\n".to_string()),
                };
                let deploy = DeployConfig::resolve(
                    &Config::default(),
                    temp.path(),
                    Some(&overrides),
                    RunFlags::default(),
                )
                .unwrap();
                assert_eq!(deploy.distribution_id().as_str(), "E2ABC123");
            },
        );
    }

    #[test]
    fn invalid_bucket_name_rejected() {
        let temp = project_with_build_dir();
        let config = Config::from_yaml("bucket: Not_A_Bucket\ndistribution_id: E1\n").unwrap();
        let err =
            DeployConfig::resolve(&config, temp.path(), None, RunFlags::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn missing_build_dir_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::from_yaml("bucket: demo-bucket\ndistribution_id: E1\n").unwrap();
        let err =
            DeployConfig::resolve(&config, temp.path(), None, RunFlags::default()).unwrap_err();
        assert!(matches!(err, Error::BuildDirMissing(_)));
        assert_eq!(err.class(), ErrorClass::Configuration);
    }

    #[test]
    fn blank_literal_names_the_conventional_variable() {
        let temp = project_with_build_dir();
        let config = Config::from_yaml("bucket: demo-bucket\ndistribution_id: ''\n").unwrap();
        let err =
            DeployConfig::resolve(&config, temp.path(), None, RunFlags::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("missing required configuration: {DISTRIBUTION_ENV}")
        );
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let temp = project_with_build_dir();
        let config = Config::from_yaml(
            "bucket: demo-bucket\ndistribution_id: E1\nupload_concurrency: 0\n",
        )
        .unwrap();
        let deploy =
            DeployConfig::resolve(&config, temp.path(), None, RunFlags::default()).unwrap();
        assert_eq!(deploy.upload_concurrency(), 1);
    }
}

mod init {
    use super::*;

    #[test]
    fn writes_template_once() {
        let temp = tempfile::tempdir().unwrap();
        init_config(temp.path(), false).unwrap();
        assert!(temp.path().join("skylift.yml").exists());

        let err = init_config(temp.path(), false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        init_config(temp.path(), true).unwrap();
    }
}
