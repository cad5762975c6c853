mod app;
mod model;
mod util;

use std::path::PathBuf;

use clap::Parser;

use model::MediatorPolicy;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the assemblage dataset (JSON with `nodes` and `edges`).
    #[arg(long)]
    dataset: PathBuf,

    /// Identifier used to key stored preferences and cached interpretations.
    /// Defaults to the dataset file stem.
    #[arg(long)]
    comparison_id: Option<String>,

    /// How targets for the synthetic mediator node are chosen.
    #[arg(long, value_enum, default_value_t = MediatorPolicy::PreferPolicies)]
    mediator_policy: MediatorPolicy,

    /// Directory for the preference store. Defaults to the user data dir.
    #[arg(long)]
    prefs_dir: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let comparison_id = args.comparison_id.clone().unwrap_or_else(|| {
        args.dataset
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "assemblage".to_owned())
    });

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "assemblage-scope",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::AssemblageApp::new(
                cc,
                app::AppOptions {
                    dataset_path: args.dataset.clone(),
                    comparison_id,
                    mediator_policy: args.mediator_policy,
                    prefs_dir: args.prefs_dir.clone(),
                },
            )))
        }),
    )
}
