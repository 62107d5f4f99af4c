// ABOUTME: Deploy command implementation.
// ABOUTME: Resolves configuration, builds the AWS clients, and runs the sync + invalidate flow.

use aws_config::{BehaviorVersion, Region};
use skylift::cdn::CloudFrontCdn;
use skylift::config::{DeployConfig, RunFlags};
use skylift::diagnostics::Diagnostics;
use skylift::error::Result;
use skylift::infra::{InfraSettings, TokioCommandRunner};
use skylift::release::{self, CtrlC, InfraFlow};
use skylift::sync::S3Store;

use super::Context;

pub async fn deploy(
    ctx: &Context,
    dry_run: bool,
    from_infra: bool,
    force_unlock: bool,
) -> Result<()> {
    let output = ctx.output();
    let mut diag = Diagnostics::default();

    let overrides = if from_infra {
        output.progress("Reading infrastructure outputs...");
        let settings = InfraSettings::from_config(&ctx.config, &ctx.project_dir, ctx.verbose);
        let outputs = InfraFlow::new(&TokioCommandRunner, settings, force_unlock)
            .with_interrupt(CtrlC::listen()?)
            .outputs(&mut diag)
            .await?;
        Some(outputs.release_overrides())
    } else {
        None
    };

    let config = DeployConfig::resolve(
        &ctx.config,
        &ctx.project_dir,
        overrides.as_ref(),
        RunFlags {
            dry_run,
            verbose: ctx.verbose,
        },
    )?;

    if config.dry_run() {
        output.progress("Dry run: nothing will be uploaded or invalidated");
    }
    output.progress(&format!(
        "Deploying {} to s3://{} ({})",
        config.build_dir().display(),
        config.bucket(),
        config.region()
    ));

    // Credentials resolve lazily, so a dry run never reaches AWS.
    let sdk = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region().to_string()))
        .load()
        .await;
    let store = S3Store::new(aws_sdk_s3::Client::new(&sdk), config.bucket().clone());
    let cdn = CloudFrontCdn::new(aws_sdk_cloudfront::Client::new(&sdk));

    let report = release::deploy(&config, &store, &cdn, &mut diag).await?;
    output.report("deploy", &report);

    let verb = if report.sync.dry_run {
        "Would upload"
    } else {
        "Uploaded"
    };
    output.progress(&format!(
        "{verb} {} file(s) in {:.1}s",
        report.sync.uploaded(),
        report.sync.elapsed.as_secs_f64()
    ));
    if let Some(invalidation) = &report.invalidation {
        output.progress(&format!(
            "Invalidation {} created for {} ({})",
            invalidation.id,
            invalidation.distribution,
            invalidation.paths.join(", ")
        ));
    }

    output.diagnostics(&diag);
    output.success(&format!(
        "Deployed to {}",
        config.bucket().website_url(config.region())
    ));
    Ok(())
}
