//! # Springwright CLI
//!
//! Command line front end for the compression spring engine.
//!
//! ```text
//! spring_cli compute --target 20 --load 30 --height 80 --solid 60
//! spring_cli list end-types
//! spring_cli apply valves.spring --label S-1 --load 30 --yes
//! spring_cli show valves.spring
//! ```
//!
//! Engine settings are read from `spring_engine.toml` (or `--config`) when
//! present. Errors are printed with their code, and as JSON with `--json`.
//!
//! Unknown material, service or end type keys are refused; `--lenient`
//! computes with the engine's default values instead.

mod logger;
mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use spring_core::calculations::design::{compute_design_with, Handedness, SpringInput};
use spring_core::calculations::diameter::DiameterType;
use spring_core::calculations::sizing::SelectionMode;
use spring_core::config::{EngineSettings, SETTINGS_FILE};
use spring_core::errors::{CalcError, CalcResult};
use spring_core::file_io::{load_project, load_project_with_lock_check, save_project, with_project_extension, FileLock};
use spring_core::helix::HelixPlan;
use spring_core::project::Project;
use spring_core::reference::ReferenceData;
use spring_core::representation::Representation;

#[derive(Parser, Debug)]
#[command(name = "spring_cli", version, about = "Compression spring calculator (EN 13906-1)")]
struct Cli {
    /// Engine settings file
    #[arg(long, global = true, default_value = SETTINGS_FILE)]
    config: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Machine-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Size a spring and print the report
    Compute {
        /// Start from a SpringInput JSON file
        #[arg(long)]
        input: Option<PathBuf>,

        /// Also print the 3D build plan
        #[arg(long)]
        plan: bool,

        #[command(flatten)]
        spring: SpringArgs,
    },
    /// List a reference table
    List {
        #[arg(value_enum)]
        table: Table,
    },
    /// Size a spring and store it in a project file
    Apply {
        project: PathBuf,

        /// Spring label; an existing spring with this label is updated
        #[arg(long, default_value = "S-1")]
        label: String,

        /// Confirm the design even if it carries alerts
        #[arg(long)]
        yes: bool,

        /// User recorded in the lock file
        #[arg(long, default_value = "spring_cli")]
        user: String,

        #[command(flatten)]
        spring: SpringArgs,
    },
    /// Print the springs stored in a project file
    Show { project: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Materials,
    Services,
    EndTypes,
    Diameters,
}

/// Spring parameters; unset values keep the base input.
#[derive(Args, Debug, Default)]
struct SpringArgs {
    #[arg(long)]
    material: Option<String>,
    /// Service class key
    #[arg(long)]
    service: Option<String>,
    #[arg(long)]
    end_type: Option<String>,
    /// dm, di or de
    #[arg(long)]
    diameter_type: Option<DiameterType>,
    /// Target diameter (mm)
    #[arg(long)]
    target: Option<f64>,
    /// Starting wire diameter (mm)
    #[arg(long)]
    wire: Option<f64>,
    /// Working load (daN)
    #[arg(long)]
    load: Option<f64>,
    /// Height under load (mm)
    #[arg(long)]
    height: Option<f64>,
    /// Maximum solid length (mm)
    #[arg(long)]
    solid: Option<f64>,
    /// Dead turns per end
    #[arg(long)]
    dead_turns: Option<f64>,
    /// right or left
    #[arg(long)]
    hand: Option<Handedness>,
    /// Keep the starting wire if it satisfies the stress limit
    #[arg(long)]
    keep_wire: bool,
    /// Use default values for unknown reference keys
    #[arg(long)]
    lenient: bool,
}

impl SpringArgs {
    fn apply_to(&self, mut input: SpringInput) -> SpringInput {
        if let Some(v) = &self.material {
            input.material = v.clone();
        }
        if let Some(v) = &self.service {
            input.service_class = v.clone();
        }
        if let Some(v) = &self.end_type {
            input.end_type = v.clone();
        }
        if let Some(v) = self.diameter_type {
            input.diameter_type = v;
        }
        if let Some(v) = self.target {
            input.target_diameter_mm = v;
        }
        if let Some(v) = self.wire {
            input.wire_diameter_mm = v;
        }
        if let Some(v) = self.load {
            input.load_dan = v;
        }
        if let Some(v) = self.height {
            input.height_under_load_mm = v;
        }
        if let Some(v) = self.solid {
            input.max_solid_length_mm = v;
        }
        if let Some(v) = self.dead_turns {
            input.dead_turns = v;
        }
        if let Some(v) = self.hand {
            input.handedness = v;
        }
        input.selection_mode = if self.keep_wire {
            SelectionMode::KeepCurrent
        } else {
            SelectionMode::ForceMinimum
        };
        input
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(CalcError::serialization)?;
    println!("{}", json);
    Ok(())
}

fn read_input(path: &Path) -> CalcResult<SpringInput> {
    let text = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&text).map_err(CalcError::serialization)
}

/// Loaded once per invocation
struct Context {
    settings: EngineSettings,
    data: ReferenceData,
    json: bool,
}

impl Context {
    /// Overlay the arguments on `base` and check its reference keys.
    fn resolve(&self, spring: &SpringArgs, base: SpringInput) -> CalcResult<SpringInput> {
        let input = spring.apply_to(base);
        if !spring.lenient {
            self.data
                .require_known(&input.material, &input.service_class, &input.end_type)?;
        }
        Ok(input)
    }
}

fn compute(ctx: &Context, input: Option<&Path>, plan: bool, spring: &SpringArgs) -> CalcResult<()> {
    let base = match input {
        Some(path) => read_input(path)?,
        None => SpringInput::default(),
    };
    let design = compute_design_with(&ctx.resolve(spring, base)?, &ctx.data, &ctx.settings)?;
    let helix = plan.then(|| HelixPlan::new(&design, &Representation::Loaded, &ctx.settings));

    if ctx.json {
        match &helix {
            Some(helix) => print_json(&serde_json::json!({ "design": design, "plan": helix }))?,
            None => print_json(&design)?,
        }
    } else {
        report::print_design(&design);
        if let Some(helix) = &helix {
            report::print_plan(helix);
        }
    }
    Ok(())
}

struct ApplyRequest<'a> {
    path: &'a Path,
    label: &'a str,
    confirmed: bool,
    user: &'a str,
    spring: &'a SpringArgs,
}

fn apply(ctx: &Context, req: ApplyRequest<'_>) -> CalcResult<()> {
    let lock = FileLock::acquire(&with_project_extension(req.path), req.user)?;
    let path = lock.project_path();

    let mut project = if path.exists() {
        load_project(path)?
    } else {
        log::info!("creating new project {}", path.display());
        Project::new(req.user, "", "")
    };

    let existing = project.find_by_label(req.label).map(|(id, item)| (id, item.clone()));
    let (existing_id, mut item) = match existing {
        Some((id, item)) => (Some(id), item),
        None => (None, project.new_spring(req.label)),
    };

    let input = ctx.resolve(req.spring, item.input.clone())?;
    let design = compute_design_with(&input, &ctx.data, &ctx.settings)?;
    if !ctx.json {
        report::print_design(&design);
    }
    item.apply(&design, req.confirmed)?;

    let id = match existing_id {
        Some(id) => {
            project.springs.insert(id, item);
            project.touch();
            id
        }
        None => project.add_spring(item),
    };
    save_project(&project, path)?;

    if ctx.json {
        print_json(&project.get_spring(&id))?;
    } else {
        println!("Saved '{}' to {}", req.label, path.display());
    }
    Ok(())
}

fn run(cli: &Cli) -> CalcResult<()> {
    let settings = EngineSettings::load_or_default(&cli.config)?;
    let ctx = Context {
        data: settings.reference_data()?,
        settings,
        json: cli.json,
    };

    match &cli.command {
        Command::Compute { input, plan, spring } => compute(&ctx, input.as_deref(), *plan, spring),
        Command::List { table } => {
            let data = &ctx.data;
            if ctx.json {
                match table {
                    Table::Materials => print_json(&data.materials),
                    Table::Services => print_json(&data.services),
                    Table::EndTypes => print_json(&data.end_types.ordered()),
                    Table::Diameters => print_json(&data.wire_diameters().value()),
                }
            } else {
                report::print_reference(data, *table);
                Ok(())
            }
        }
        Command::Apply {
            project,
            label,
            yes,
            user,
            spring,
        } => apply(
            &ctx,
            ApplyRequest {
                path: project,
                label,
                confirmed: *yes,
                user,
                spring,
            },
        ),
        Command::Show { project } => {
            let (project, lock) = load_project_with_lock_check(&with_project_extension(project))?;
            if ctx.json {
                print_json(&serde_json::json!({ "project": project, "lock": lock }))
            } else {
                report::print_project(&project, lock.as_ref());
                Ok(())
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.error_code(), e);
            if matches!(e, CalcError::UnconfirmedAlerts { .. }) {
                eprintln!("Re-run with --yes to apply a design that carries alerts.");
            }
            if cli.json {
                if let Ok(json) = serde_json::to_string_pretty(&e) {
                    eprintln!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_compute() {
        let cli = Cli::try_parse_from([
            "spring_cli", "compute", "--target", "20", "--load", "30", "--diameter-type", "di", "--hand", "left",
        ])
        .unwrap();
        match cli.command {
            Command::Compute { spring, .. } => {
                let input = spring.apply_to(SpringInput::default());
                assert_eq!(input.target_diameter_mm, 20.0);
                assert_eq!(input.load_dan, 30.0);
                assert_eq!(input.diameter_type, DiameterType::Inner);
                assert_eq!(input.handedness, Handedness::Left);
                assert_eq!(input.selection_mode, SelectionMode::ForceMinimum);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_apply_and_list() {
        let cli = Cli::try_parse_from(["spring_cli", "-vv", "apply", "p.spring", "--yes", "--keep-wire"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Apply { yes, label, spring, .. } => {
                assert!(yes);
                assert_eq!(label, "S-1");
                let input = spring.apply_to(SpringInput::default());
                assert_eq!(input.selection_mode, SelectionMode::KeepCurrent);
            }
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["spring_cli", "list", "end-types"]).unwrap();
        assert!(matches!(cli.command, Command::List { table: Table::EndTypes }));
    }

    fn context() -> Context {
        Context {
            settings: EngineSettings::default(),
            data: ReferenceData::builtin().unwrap(),
            json: false,
        }
    }

    #[test]
    fn test_unknown_material_is_refused() {
        let ctx = context();
        let spring = SpringArgs {
            material: Some("UNOBTAINIUM".to_string()),
            ..SpringArgs::default()
        };
        let err = ctx.resolve(&spring, SpringInput::default()).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_REFERENCE");

        let lenient = SpringArgs { lenient: true, ..spring };
        let input = ctx.resolve(&lenient, SpringInput::default()).unwrap();
        assert_eq!(input.material, "UNOBTAINIUM");
    }

    #[test]
    fn test_known_keys_resolve() {
        let cli = Cli::try_parse_from(["spring_cli", "compute", "--end-type", "CUT", "--lenient"]).unwrap();
        match cli.command {
            Command::Compute { spring, .. } => {
                assert!(spring.lenient);
                let input = context().resolve(&spring, SpringInput::default()).unwrap();
                assert_eq!(input.end_type, "CUT");
            }
            other => panic!("unexpected {:?}", other),
        }
        let strict = SpringArgs {
            end_type: Some("CUT".to_string()),
            ..SpringArgs::default()
        };
        assert!(context().resolve(&strict, SpringInput::default()).is_ok());
    }

    #[test]
    fn test_unset_args_keep_base_input() {
        let base = SpringInput {
            material: "STAINLESS_302".to_string(),
            ..SpringInput::default()
        };
        let input = SpringArgs::default().apply_to(base.clone());
        assert_eq!(input.material, base.material);
        assert_eq!(input.load_dan, base.load_dan);
    }
}
