use clap::{command, Arg, ArgAction, ArgMatches};
use log::{error, info, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use timetabler::catalog::Catalog;
use timetabler::config::ModelConfig;
use timetabler::io;
use timetabler::model::TimetableModel;
use timetabler::solver::GoodLpSolver;
use timetabler::ScheduleError;

fn main() {
    env_logger::init();

    let args = command!()
        .arg(
            Arg::new("COURSES")
                .help("The course table (CSV)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("TEACHERS")
                .help("The teacher table (CSV)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("ROSTER")
                .help("The student roster (CSV)")
                .required(true)
                .index(3),
        )
        .arg(
            Arg::new("PREFERENCES")
                .help("The student preference matrix (CSV)")
                .required(true)
                .index(4),
        )
        .arg(
            Arg::new("proximity")
                .short('x')
                .long("proximity")
                .value_name("FILE")
                .help("The course/subject proximity table (CSV)"),
        )
        .arg(
            Arg::new("rooms")
                .short('r')
                .long("rooms")
                .value_name("FILE")
                .help("JSON list of rooms. If omitted, the built-in room list is used."),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("JSON model configuration (constraint toggles, proximity bounds, periods, solver parameters)"),
        )
        .arg(
            Arg::new("requirements")
                .short('q')
                .long("requirements")
                .value_name("FILE")
                .help("JSON list of grade-level course requirements"),
        )
        .arg(
            Arg::new("outdir")
                .short('o')
                .long("outdir")
                .value_name("DIR")
                .help("Directory to write the JSON result and the student schedules to"),
        )
        .arg(
            Arg::new("print")
                .short('p')
                .long("print")
                .action(ArgAction::SetTrue)
                .help("Print the timetable grid and the student diagnostics to stdout"),
        )
        .arg(
            Arg::new("require-optimal")
                .long("require-optimal")
                .action(ArgAction::SetTrue)
                .help("Fail if the solver could not prove optimality"),
        )
        .get_matches();

    let config = match optional_path(&args, "config") {
        Some(path) => open(&path).and_then(ModelConfig::read),
        None => Ok(ModelConfig::default()),
    }
    .unwrap_or_else(|e| exit_with(e));
    let catalog = read_catalog(&args, &config).unwrap_or_else(|e| exit_with(e));
    let requirements = match optional_path(&args, "requirements") {
        Some(path) => open(&path).and_then(io::simple::read_requirements),
        None => Ok(Vec::new()),
    }
    .unwrap_or_else(|e| exit_with(e));
    info!(
        "Read {} courses, {} students, {} teachers, {} rooms and {} requirements",
        catalog.courses.len(),
        catalog.students.len(),
        catalog.teachers.len(),
        catalog.rooms.len(),
        requirements.len()
    );

    let model = TimetableModel::build(&catalog, &requirements, &config)
        .unwrap_or_else(|e| exit_with(e));
    let mut outcome = model.solve(&GoodLpSolver).unwrap_or_else(|e| exit_with(e));
    if args.get_flag("require-optimal") {
        outcome = outcome.require_optimal().unwrap_or_else(|e| exit_with(e));
    }
    let timetable = model
        .decode(&catalog, &outcome)
        .unwrap_or_else(|e| exit_with(e));
    info!(
        "Found timetable with objective {} ({:?})",
        outcome.objective, outcome.status
    );

    if args.get_flag("print") {
        print!("{}", io::format_grid(&timetable));
        print!("\n{}", io::format_diagnostics(&timetable));
    }

    if let Some(outdir) = optional_path(&args, "outdir") {
        let result = std::fs::create_dir_all(&outdir)
            .map_err(ScheduleError::from)
            .and_then(|_| File::create(outdir.join("timetable.json")).map_err(ScheduleError::from))
            .and_then(|file| io::simple::write(file, &timetable, &outcome))
            .and_then(|_| io::write_student_schedules(&outdir.join("schedules"), &timetable));
        if let Err(e) = result {
            error!("Could not write results: {}", e);
            std::process::exit(exitcode::CANTCREAT);
        }
    } else if !args.get_flag("print") {
        warn!("Neither --outdir nor --print given. The timetable is discarded.");
    }
}

fn optional_path(args: &ArgMatches, id: &str) -> Option<PathBuf> {
    args.get_one::<String>(id).map(PathBuf::from)
}

fn required_path(args: &ArgMatches, id: &str) -> PathBuf {
    // Required arguments are enforced by clap
    optional_path(args, id).unwrap_or_default()
}

fn open(path: &Path) -> Result<File, ScheduleError> {
    File::open(path).map_err(|e| {
        error!("Could not open {}: {}", path.display(), e);
        ScheduleError::from(e)
    })
}

fn read_catalog(args: &ArgMatches, config: &ModelConfig) -> Result<Catalog, ScheduleError> {
    let courses = io::tables::read_courses(open(&required_path(args, "COURSES"))?)?;
    let teachers = io::tables::read_teacher_assignments(open(&required_path(args, "TEACHERS"))?)?;
    let students = io::tables::read_roster(open(&required_path(args, "ROSTER"))?)?;
    let preferences = io::tables::read_preferences(open(&required_path(args, "PREFERENCES"))?)?;
    let subjects = match optional_path(args, "proximity") {
        Some(path) => io::tables::read_proximity(open(&path)?)?,
        None => Vec::new(),
    };
    let rooms = match optional_path(args, "rooms") {
        Some(path) => io::rooms::read(open(&path)?)?,
        None => io::rooms::default_rooms(),
    };
    Catalog::new(
        courses,
        students,
        &teachers,
        rooms,
        config.periods.clone(),
        preferences,
        subjects,
    )
}

/// Log the error and exit with the matching exit code
fn exit_with(e: ScheduleError) -> ! {
    error!("{}", e);
    let code = match e {
        ScheduleError::Io(_) => exitcode::NOINPUT,
        ScheduleError::Schema(_)
        | ScheduleError::InconsistentSize { .. }
        | ScheduleError::UnknownCourse(_)
        | ScheduleError::Csv(_)
        | ScheduleError::Json(_) => exitcode::DATAERR,
        ScheduleError::DuplicateVariable(_)
        | ScheduleError::MissingVariable(_)
        | ScheduleError::InfeasibleModel
        | ScheduleError::SolverTimeout { .. }
        | ScheduleError::Solver(_) => exitcode::SOFTWARE,
    };
    std::process::exit(code)
}
