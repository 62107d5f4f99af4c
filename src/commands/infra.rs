// ABOUTME: Infra command implementation.
// ABOUTME: Runs plan/apply/destroy/output flows and renders their results.

use skylift::diagnostics::Diagnostics;
use skylift::error::Result;
use skylift::infra::{
    DestroyApproval, InfraOutputs, InfraSettings, KeypressConfirm, PlanStatus,
    TokioCommandRunner,
};
use skylift::output::Output;
use skylift::release::{ApplyReport, CtrlC, InfraFlow, PlanReport};

use super::Context;
use crate::cli::InfraAction;

pub async fn infra(ctx: &Context, action: InfraAction) -> Result<()> {
    let output = ctx.output();
    let mut diag = Diagnostics::default();
    let runner = TokioCommandRunner;
    let settings = InfraSettings::from_config(&ctx.config, &ctx.project_dir, ctx.verbose);

    match action {
        InfraAction::Plan { lock } => {
            let flow = InfraFlow::new(&runner, settings, lock.force_unlock)
                .with_interrupt(CtrlC::listen()?);
            output.progress(&format!(
                "Planning infrastructure in {}...",
                flow.settings().dir.display()
            ));
            let report = flow.plan(&mut diag).await?;
            render_plan(&output, &report);
            output.diagnostics(&diag);
            output.success(plan_message(report.status));
        }
        InfraAction::Apply {
            auto_approve,
            dry_run,
            lock,
        } => {
            let flow = InfraFlow::new(&runner, settings, lock.force_unlock)
                .with_interrupt(CtrlC::listen()?);
            if dry_run {
                output.progress("Dry run: planning only, nothing will be applied");
            }
            let confirm = KeypressConfirm::new();
            match flow
                .apply(auto_approve, &confirm, dry_run, &mut diag)
                .await?
            {
                ApplyReport::Planned(report) => {
                    render_plan(&output, &report);
                    output.diagnostics(&diag);
                    output.success(plan_message(report.status));
                }
                ApplyReport::Applied { plan, outputs } => {
                    if plan.status == PlanStatus::NoChange {
                        output.progress("No changes pending; applying saved plan anyway");
                    }
                    render_outputs(&output, &outputs);
                    output.diagnostics(&diag);
                    output.success("Infrastructure applied");
                }
            }
        }
        InfraAction::Destroy { auto_approve, lock } => {
            // Ask before anything touches the engine
            let approval = DestroyApproval::obtain(auto_approve, &KeypressConfirm::new())?;
            let flow = InfraFlow::new(&runner, settings, lock.force_unlock)
                .with_interrupt(CtrlC::listen()?);
            output.progress("Destroying infrastructure...");
            flow.destroy(approval, &mut diag).await?;
            output.diagnostics(&diag);
            output.success("Infrastructure destroyed");
        }
        InfraAction::Output { export, lock } => {
            let flow = InfraFlow::new(&runner, settings, lock.force_unlock)
                .with_interrupt(CtrlC::listen()?);
            let outputs = flow.outputs(&mut diag).await?;
            output.diagnostics(&diag);
            if export {
                for line in outputs.export_lines() {
                    println!("{line}");
                }
            } else {
                render_outputs(&output, &outputs);
            }
        }
    }

    Ok(())
}

fn plan_message(status: PlanStatus) -> &'static str {
    match status {
        PlanStatus::NoChange => "No changes. Infrastructure matches the configuration.",
        PlanStatus::ChangesPending => "Changes pending. Run `skylift infra apply` to apply them.",
    }
}

fn render_plan(output: &Output, report: &PlanReport) {
    output.report("plan", report);
    let text = report.output.trim();
    if !text.is_empty() {
        output.progress(text);
    }
}

fn render_outputs(output: &Output, outputs: &InfraOutputs) {
    if outputs.is_empty() {
        output.progress("No infrastructure outputs declared");
        return;
    }

    let masked: Vec<(String, String)> = outputs
        .iter()
        .map(|(name, value)| {
            let shown = if outputs.is_sensitive(name) {
                "<sensitive>".to_string()
            } else {
                value.to_string()
            };
            (name.to_string(), shown)
        })
        .collect();

    let map: std::collections::BTreeMap<&str, &str> = masked
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    output.report("outputs", &map);

    output.progress("Outputs:");
    for (name, value) in &masked {
        output.progress(&format!("  {name} = {value}"));
    }
}
