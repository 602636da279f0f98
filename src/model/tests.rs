use super::{ConstraintFamily, LinearModel, TimetableModel, VarKey, VariableRegistry};
use crate::catalog::tests::{assignment, course, periods, room, student};
use crate::catalog::Catalog;
use crate::config::ModelConfig;
use crate::decode::RoomSlot;
use crate::solver::{GoodLpSolver, SolveOutcome, SolveParams, SolveStatus, SolvedValues, Solver};
use crate::{Course, Requirement, Result, RoomClass, RoomType, ScheduleError};
use assert_float_eq::*;
use ndarray::array;

/// 2 students; a double period (courses 0 and 1), a single course (2) and a filler (3) in two
/// periods. Both students like course 2 best.
fn create_simple_problem() -> Catalog {
    let mut double = course("Lab", 10);
    double.double_period = true;
    let catalog = Catalog::new(
        vec![double, course("Lab", 10), course("Drama", 2), course("Empty", 99)],
        vec![student("Anton", Some(9)), student("Berta", Some(10))],
        &[assignment("Mr. Blue", "Drama")],
        vec![room("U1", RoomClass::General), room("U2", RoomClass::General)],
        periods(&[1, 2]),
        array![[0.0, 0.0, 5.0, 0.0], [0.0, 0.0, 5.0, 0.0]],
        vec![],
    )
    .unwrap();
    crate::assert_data_consistency(&catalog);
    catalog
}

/// Variable values with all the given variables set to 1 and all others to 0
fn assign(model: &LinearModel, ones: &[VarKey]) -> Vec<f64> {
    let mut values = vec![0.0; model.registry.len()];
    for key in ones {
        values[model.registry.get(*key).unwrap()] = 1.0;
    }
    values
}

fn enrolled(student: usize, course: usize) -> VarKey {
    VarKey::Enrolled { student, course }
}

fn scheduled(course: usize, period: usize) -> VarKey {
    VarKey::Scheduled { course, period }
}

fn attends(student: usize, course: usize, period: usize) -> VarKey {
    VarKey::Attends {
        student,
        course,
        period,
    }
}

fn in_room(course: usize, room: usize, period: usize) -> VarKey {
    VarKey::InRoom {
        course,
        room,
        period,
    }
}

/// A valid timetable of the simple problem: the double period in periods 1+2, Drama in period 1,
/// the filler in period 2. Anton takes the double period, Berta takes Drama and the filler.
fn valid_simple_assignment() -> Vec<VarKey> {
    vec![
        scheduled(0, 0),
        scheduled(1, 1),
        scheduled(2, 0),
        scheduled(3, 1),
        enrolled(0, 0),
        enrolled(0, 1),
        attends(0, 0, 0),
        attends(0, 1, 1),
        enrolled(1, 2),
        enrolled(1, 3),
        attends(1, 2, 0),
        attends(1, 3, 1),
        in_room(0, 0, 0),
        in_room(1, 0, 1),
        in_room(2, 1, 0),
    ]
}

fn violated_families(model: &LinearModel, values: &[f64]) -> Vec<ConstraintFamily> {
    let mut families: Vec<ConstraintFamily> =
        model.violations(values).iter().map(|c| c.family).collect();
    families.dedup();
    families
}

/// Replace one variable of an assignment by another
fn replace(keys: &[VarKey], old: VarKey, new: VarKey) -> Vec<VarKey> {
    keys.iter()
        .map(|k| if *k == old { new } else { *k })
        .collect()
}

#[test]
fn test_registry() {
    let catalog = create_simple_problem();
    let registry = VariableRegistry::allocate_all(&catalog).unwrap();
    // X: 2*4, CourseAssign: 4*2, U: 2*4*2, RoomAssign: 3 meaningful * 2 rooms * 2 periods
    assert_eq!(registry.len(), 8 + 8 + 16 + 12);

    let id = registry.x(1, 2).unwrap();
    assert_eq!(registry.key(id), enrolled(1, 2));
    assert_eq!(registry.name(id), "Student 1 in course 2");
    assert_eq!(
        registry.name(registry.room(0, 1, 1).unwrap()),
        "Course 0 in room U2 during period 2"
    );
    // Fillers have no room variables
    assert!(matches!(
        registry.room(3, 0, 0),
        Err(ScheduleError::MissingVariable(_))
    ));
    assert!(matches!(
        registry.u(0, 0, 2),
        Err(ScheduleError::MissingVariable(_))
    ));

    let mut registry = registry;
    assert!(matches!(
        registry.allocate(enrolled(0, 0), "again".to_owned()),
        Err(ScheduleError::DuplicateVariable(name)) if name == "again"
    ));
}

#[test]
fn test_valid_assignment_satisfies_all_constraints() {
    let catalog = create_simple_problem();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    let values = assign(&model.lp, &valid_simple_assignment());
    let violations = model.lp.violations(&values);
    assert!(
        violations.is_empty(),
        "Unexpected violations: {:?}",
        violations
    );
    // Berta: 5 for Drama, -1 for the filler
    assert_float_absolute_eq!(model.lp.objective_value(&values), 4.0, 1e-9);
}

#[test]
fn test_single_assignment_and_linking() {
    let catalog = create_simple_problem();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();

    // Berta attends nothing in period 2
    let mut keys = valid_simple_assignment();
    keys.retain(|k| *k != attends(1, 3, 1));
    let families = violated_families(&model.lp, &assign(&model.lp, &keys));
    assert!(families.contains(&ConstraintFamily::SingleAssignment));
    assert!(families.contains(&ConstraintFamily::Linking));

    // Berta attends the filler in period 1, where it is not held
    let keys = replace(
        &valid_simple_assignment(),
        attends(1, 3, 1),
        attends(1, 3, 0),
    );
    let families = violated_families(&model.lp, &assign(&model.lp, &keys));
    assert!(families.contains(&ConstraintFamily::Linking));
}

#[test]
fn test_double_period_constraints() {
    let catalog = create_simple_problem();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();

    // Anton only takes the first half
    let mut keys = valid_simple_assignment();
    keys.retain(|k| *k != enrolled(0, 1) && *k != attends(0, 1, 1));
    keys.push(enrolled(0, 3));
    keys.push(attends(0, 3, 1));
    let families = violated_families(&model.lp, &assign(&model.lp, &keys));
    assert_eq!(families, vec![ConstraintFamily::CoursePeriods]);

    // Second half in a different room
    let keys = replace(&valid_simple_assignment(), in_room(1, 0, 1), in_room(1, 1, 1));
    let families = violated_families(&model.lp, &assign(&model.lp, &keys));
    assert_eq!(families, vec![ConstraintFamily::Rooms]);

    // A double period can not start in the last period
    let catalog = create_simple_problem();
    let mut config = ModelConfig::default();
    config.constraints.set(ConstraintFamily::Rooms, false);
    let model = TimetableModel::build(&catalog, &[], &config).unwrap();
    let values = assign(&model.lp, &[scheduled(0, 1), scheduled(1, 0)]);
    assert!(model
        .lp
        .violations(&values)
        .iter()
        .any(|c| c.family == ConstraintFamily::CoursePeriods));
}

#[test]
fn test_double_start_barred_by_period_layout() {
    let mut double = course("Lab", 10);
    double.double_period = true;
    let mut layout = periods(&[3, 4, 7]);
    layout[1].double_start = false;
    let catalog = Catalog::new(
        vec![double, course("Lab", 10), course("Empty 1", 99), course("Empty 2", 99)],
        vec![student("Anton", Some(9))],
        &[],
        vec![room("U1", RoomClass::General)],
        layout,
        array![[1.0, 1.0, 0.0, 0.0]],
        vec![],
    )
    .unwrap();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    let outcome = model.solve(&GoodLpSolver).unwrap();
    let timetable = model.decode(&catalog, &outcome).unwrap();
    // Starting in period 4 is barred and period 7 has no successor
    assert_eq!(timetable.period_of(0), Some(0));
    assert_eq!(timetable.period_of(1), Some(1));
    assert!(model.lp.violations(&rounded(&outcome)).is_empty());
}

#[test]
fn test_capacity_and_teacher_overlap() {
    let catalog = Catalog::new(
        vec![
            course("Drama", 1),
            course("Poetry", 10),
            course("Other 1", 0),
            course("Other 2", 0),
        ],
        vec![student("Anton", Some(9)), student("Berta", Some(9))],
        &[assignment("Mr. Blue", "Drama"), assignment("Mr. Blue", "Poetry")],
        vec![room("U1", RoomClass::General), room("U2", RoomClass::General)],
        periods(&[1, 2]),
        ndarray::Array2::zeros((2, 4)),
        vec![],
    )
    .unwrap();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();

    // Both in Drama (max 1), Mr. Blue teaching Drama and Poetry in period 1. Fillers have max
    // size 0, but are exempt. The placeholders are held in their pinned periods.
    let keys = vec![
        scheduled(0, 0),
        scheduled(1, 0),
        scheduled(2, 0),
        scheduled(3, 1),
        enrolled(0, 0),
        enrolled(1, 0),
        enrolled(0, 3),
        enrolled(1, 3),
        attends(0, 0, 0),
        attends(1, 0, 0),
        attends(0, 3, 1),
        attends(1, 3, 1),
        in_room(0, 0, 0),
        in_room(1, 1, 0),
    ];
    let families = violated_families(&model.lp, &assign(&model.lp, &keys));
    assert_eq!(
        families,
        vec![ConstraintFamily::Capacity, ConstraintFamily::TeacherOverlap]
    );

    // Other 1 moved out of its period
    let keys = replace(&keys, scheduled(2, 0), scheduled(2, 1));
    assert!(violated_families(&model.lp, &assign(&model.lp, &keys))
        .contains(&ConstraintFamily::FillerPlacement));
}

#[test]
fn test_min_capacity_toggle() {
    let mut drama = course("Drama", 10);
    drama.num_min = 2;
    let catalog = Catalog::new(
        vec![drama, course("Empty", 99)],
        vec![student("Anton", Some(9))],
        &[],
        vec![room("U1", RoomClass::General)],
        periods(&[1, 2]),
        array![[1.0, 0.0]],
        vec![],
    )
    .unwrap();

    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    assert_eq!(
        model
            .lp
            .constraints
            .iter()
            .filter(|c| c.family == ConstraintFamily::Capacity)
            .count(),
        1
    );

    let mut config = ModelConfig::default();
    config.constraints.min_capacity = true;
    let model = TimetableModel::build(&catalog, &[], &config).unwrap();
    assert_eq!(
        model
            .lp
            .constraints
            .iter()
            .filter(|c| c.family == ConstraintFamily::Capacity)
            .count(),
        2
    );
    // Drama needs 2 students, there is only one
    assert!(matches!(
        model.solve(&GoodLpSolver),
        Err(ScheduleError::InfeasibleModel)
    ));
}

#[test]
fn test_constraint_toggles() {
    let catalog = create_simple_problem();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    let families: Vec<ConstraintFamily> = model
        .lp
        .constraint_counts()
        .into_iter()
        .map(|(f, _)| f)
        .collect();
    // No proximity subjects, requirements or placeholder fillers
    assert_eq!(
        families,
        vec![
            ConstraintFamily::SingleAssignment,
            ConstraintFamily::Linking,
            ConstraintFamily::Capacity,
            ConstraintFamily::TeacherOverlap,
            ConstraintFamily::CoursePeriods,
            ConstraintFamily::Rooms,
        ]
    );

    let mut config = ModelConfig::default();
    config.constraints.set(ConstraintFamily::Rooms, false);
    config.constraints.set(ConstraintFamily::TeacherOverlap, false);
    let model = TimetableModel::build(&catalog, &[], &config).unwrap();
    let counts = model.lp.constraint_counts();
    assert!(counts.iter().all(|(f, _)| *f != ConstraintFamily::Rooms));
    assert!(counts
        .iter()
        .all(|(f, _)| *f != ConstraintFamily::TeacherOverlap));
    // 2 students * 2 periods
    assert_eq!(counts[0], (ConstraintFamily::SingleAssignment, 4));
}

#[test]
fn test_proximity() {
    let mut subjects = vec![crate::catalog::Subject {
        name: "Science".to_owned(),
        weights: array![1.0, 1.0, 0.0],
    }];
    subjects.push(crate::catalog::Subject {
        name: "Other".to_owned(),
        weights: array![0.0, 0.0, 1.0],
    });
    let catalog = Catalog::new(
        vec![course("Biology", 10), course("Physics", 10), course("Empty", 99)],
        vec![student("Anton", Some(9))],
        &[],
        vec![room("U1", RoomClass::General), room("U2", RoomClass::General)],
        periods(&[1, 2]),
        array![[3.0, 3.0, 0.0]],
        subjects,
    )
    .unwrap();

    let mut config = ModelConfig::default();
    config.proximity.default_max = 1.0;
    let model = TimetableModel::build(&catalog, &[], &config).unwrap();
    // The "Other" subject is ignored
    assert_eq!(
        model.lp.constraint_counts()[3],
        (ConstraintFamily::Proximity, 1)
    );
    let values = assign(&model.lp, &[enrolled(0, 0), enrolled(0, 1)]);
    assert!(model
        .lp
        .violations(&values)
        .iter()
        .any(|c| c.family == ConstraintFamily::Proximity));

    let outcome = model.solve(&GoodLpSolver).unwrap();
    let timetable = model.decode(&catalog, &outcome).unwrap();
    assert_eq!(
        timetable.is_enrolled(0, 0) as u32 + timetable.is_enrolled(0, 1) as u32,
        1
    );
}

/// Round the solution like the decoder does
fn rounded(outcome: &SolveOutcome) -> Vec<f64> {
    outcome
        .values
        .as_slice()
        .iter()
        .map(|v| if *v >= 0.75 { 1.0 } else { 0.0 })
        .collect()
}

#[test]
fn test_solve_simple_problem() {
    let catalog = create_simple_problem();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    let outcome = model.solve(&GoodLpSolver).unwrap();
    assert_eq!(outcome.status, SolveStatus::Optimal);
    // Both students: 5 for Drama, -1 for the filler
    assert_float_absolute_eq!(outcome.objective, 8.0, 1e-6);
    assert!(model.lp.violations(&rounded(&outcome)).is_empty());

    let timetable = model.decode(&catalog, &outcome).unwrap();
    for s in 0..2 {
        assert!(timetable.is_enrolled(s, 2));
        assert!(timetable.is_enrolled(s, 3));
        assert!(!timetable.is_enrolled(s, 0));
        assert!(!timetable.is_enrolled(s, 1));
    }
    assert_eq!(timetable.enrollment(2), 2);
    assert_eq!(timetable.period_of(0), Some(0));
    assert_eq!(timetable.period_of(1), Some(1));
    let drama = timetable.period_of(2).unwrap();
    let filler = timetable.period_of(3).unwrap();
    assert_ne!(drama, filler);

    let schedule = timetable.student_schedule(0);
    assert_eq!(schedule.len(), 2);
    let drama_row = schedule.iter().find(|r| r.course == "Drama").unwrap();
    assert_eq!(drama_row.teacher, Some("Mr. Blue"));
    assert!(matches!(drama_row.room, RoomSlot::Room(_)));
    let filler_row = schedule.iter().find(|r| r.course == "Empty").unwrap();
    assert_eq!(filler_row.room, RoomSlot::NotApplicable);
    assert_eq!(filler_row.teacher, None);

    let grids = timetable.period_grids();
    assert_eq!(grids.len(), 2);
    assert_eq!(grids[0].period, 1);
    // The filler is not part of the grid
    assert_eq!(grids.iter().map(|g| g.rows.len()).sum::<usize>(), 3);
    for grid in grids.iter() {
        let mut rooms: Vec<String> = grid.rows.iter().map(|r| r.room.to_string()).collect();
        rooms.dedup();
        assert_eq!(rooms.len(), grid.rows.len(), "Room used twice in {:?}", grid);
    }

    let diagnostics = timetable.diagnostics();
    assert_float_absolute_eq!(diagnostics[0].score, 5.0, 1e-9);
    assert_eq!(diagnostics[0].bad_assignments, vec!["Empty"]);
}

#[test]
fn test_decoding_is_idempotent() {
    let catalog = create_simple_problem();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    let outcome = model.solve(&GoodLpSolver).unwrap();
    let first = model.decode(&catalog, &outcome).unwrap();
    let second = model.decode(&catalog, &outcome).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.period_grids(), second.period_grids());
    assert_eq!(
        crate::io::format_grid(&first),
        crate::io::format_grid(&second)
    );
}

fn two_instance_problem() -> Catalog {
    let mut biology = course("Biology", 10);
    biology.instances = 2;
    Catalog::new(
        vec![
            biology.clone(),
            biology,
            course("Art", 10),
            course("Empty", 99),
        ],
        vec![
            student("Anton", Some(9)),
            student("Berta", Some(9)),
            student("Charly", Some(10)),
        ],
        &[],
        vec![room("U1", RoomClass::General), room("U2", RoomClass::General)],
        periods(&[1, 2]),
        array![
            [0.0, 0.0, 5.0, 0.0],
            [0.0, 0.0, 5.0, 0.0],
            [-2.0, -2.0, 5.0, 0.0]
        ],
        vec![],
    )
    .unwrap()
}

#[test]
fn test_grade_requirement_on_multi_instance_course() {
    let catalog = two_instance_problem();
    let requirements = vec![Requirement {
        course1: "Biology".to_owned(),
        course2: None,
        grade: 9,
    }];
    let model = TimetableModel::build(&catalog, &requirements, &ModelConfig::default()).unwrap();
    assert_eq!(model.structure.multi_groups[0].members, vec![0, 1]);

    // A student in both instances violates the group constraint
    let values = assign(&model.lp, &[enrolled(0, 0), enrolled(0, 1)]);
    assert!(model
        .lp
        .violations(&values)
        .iter()
        .any(|c| c.family == ConstraintFamily::MultiInstance));

    let outcome = model.solve(&GoodLpSolver).unwrap();
    let timetable = model.decode(&catalog, &outcome).unwrap();
    for s in 0..2 {
        assert_eq!(
            timetable.is_enrolled(s, 0) as u32 + timetable.is_enrolled(s, 1) as u32,
            1,
            "Student {} is not in exactly one Biology instance",
            s
        );
    }
    // Charly (grade 10) is not bound and does not want Biology
    assert!(!timetable.is_enrolled(2, 0));
    assert!(!timetable.is_enrolled(2, 1));
    assert!(model.lp.violations(&rounded(&outcome)).is_empty());
}

#[test]
fn test_requirements_from_course_table() {
    let mut biology = course("Biology", 10);
    biology.instances = 2;
    biology.required_grades = vec![9];
    let catalog = Catalog::new(
        vec![biology.clone(), biology, course("Art", 10), course("Empty", 99)],
        vec![student("Anton", Some(9))],
        &[],
        vec![room("U1", RoomClass::General), room("U2", RoomClass::General)],
        periods(&[1, 2]),
        array![[0.0, 0.0, 5.0, 0.0]],
        vec![],
    )
    .unwrap();

    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    assert!(model
        .lp
        .constraint_counts()
        .iter()
        .all(|(f, _)| *f != ConstraintFamily::GradeRequirements));

    let mut config = ModelConfig::default();
    config.requirements_from_course_table = true;
    let model = TimetableModel::build(&catalog, &[], &config).unwrap();
    assert!(model
        .lp
        .constraint_counts()
        .contains(&(ConstraintFamily::GradeRequirements, 1)));
}

#[test]
fn test_unknown_requirement_course() {
    let catalog = two_instance_problem();
    let requirements = vec![Requirement {
        course1: "Biology".to_owned(),
        course2: Some("Chemistry".to_owned()),
        grade: 9,
    }];
    assert!(matches!(
        TimetableModel::build(&catalog, &requirements, &ModelConfig::default()),
        Err(ScheduleError::UnknownCourse(name)) if name == "Chemistry"
    ));
}

fn science_course(name: &str) -> Course {
    let mut c = course(name, 10);
    c.room_type = RoomType::Science;
    c
}

#[test]
fn test_science_room_restriction() {
    let catalog = Catalog::new(
        vec![science_course("Chemistry"), course("History", 10), course("Empty", 99)],
        vec![student("Anton", Some(9)), student("Berta", Some(9))],
        &[],
        vec![
            room("U1", RoomClass::General),
            room("Sci A", RoomClass::Science),
            room("U2", RoomClass::General),
        ],
        periods(&[1]),
        array![[5.0, 1.0, 0.0], [5.0, 1.0, 0.0]],
        vec![],
    )
    .unwrap();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();

    // Chemistry in a general room
    let values = assign(&model.lp, &[scheduled(0, 0), in_room(0, 0, 0)]);
    assert!(model
        .lp
        .violations(&values)
        .iter()
        .any(|c| c.family == ConstraintFamily::Rooms));

    let outcome = model.solve(&GoodLpSolver).unwrap();
    let timetable = model.decode(&catalog, &outcome).unwrap();
    assert!(timetable.is_scheduled(0, 0));
    assert_eq!(timetable.room(0, 0), RoomSlot::Room("Sci A"));
    assert!(matches!(timetable.room(1, 0), RoomSlot::Room(r) if r == "U1" || r == "U2"));
    assert_eq!(timetable.room(2, 0), RoomSlot::NotApplicable);
}

#[test]
fn test_missing_room_class_is_infeasible() {
    let catalog = Catalog::new(
        vec![science_course("Chemistry"), course("Empty", 99)],
        vec![student("Anton", Some(9))],
        &[],
        vec![room("U1", RoomClass::General)],
        periods(&[1, 2]),
        array![[1.0, 0.0]],
        vec![],
    )
    .unwrap();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    assert!(matches!(
        model.solve(&GoodLpSolver),
        Err(ScheduleError::InfeasibleModel)
    ));

    // Without room constraints, the course can be held
    let mut config = ModelConfig::default();
    config.constraints.rooms = false;
    let model = TimetableModel::build(&catalog, &[], &config).unwrap();
    let outcome = model.solve(&GoodLpSolver).unwrap();
    let timetable = model.decode(&catalog, &outcome).unwrap();
    assert!(!timetable.has_rooms());
    assert!(timetable.is_enrolled(0, 0));
    let t = timetable.period_of(0).unwrap();
    assert_eq!(timetable.room(0, t), RoomSlot::Unassigned);
    assert!(!crate::io::format_grid(&timetable).contains("U1"));
}

#[test]
fn test_filler_placement() {
    let catalog = Catalog::new(
        vec![course("Math", 10), course("Other 1", 99), course("Other 2", 99)],
        vec![student("Anton", Some(9))],
        &[],
        vec![room("U1", RoomClass::General)],
        periods(&[1, 2]),
        array![[3.0, 0.0, 0.0]],
        vec![],
    )
    .unwrap();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    assert_eq!(model.structure.filler_placement, vec![(1, 0), (2, 1)]);

    let outcome = model.solve(&GoodLpSolver).unwrap();
    // 3 for Math, -1 for one filler
    assert_float_absolute_eq!(outcome.objective, 2.0, 1e-6);
    let timetable = model.decode(&catalog, &outcome).unwrap();
    assert!(timetable.is_scheduled(1, 0));
    assert!(timetable.is_scheduled(2, 1));
    assert!(timetable.is_enrolled(0, 0));
}

/// A solver returning fixed values, to test the outcome handling without solving
struct FixedSolver {
    status: SolveStatus,
    values: Vec<f64>,
}

impl Solver for FixedSolver {
    fn solve(&self, model: &LinearModel, _params: &SolveParams) -> Result<SolveOutcome> {
        Ok(SolveOutcome {
            status: self.status,
            objective: model.objective_value(&self.values),
            values: SolvedValues::new(self.values.clone()),
        })
    }
}

#[test]
fn test_time_limited_outcome() {
    let catalog = create_simple_problem();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    let mut values = assign(&model.lp, &valid_simple_assignment());
    // Slightly off-integral solver values are rounded by the threshold rule
    for v in values.iter_mut() {
        *v = if *v > 0.5 { 0.8 } else { 0.1 };
    }
    let solver = FixedSolver {
        status: SolveStatus::TimeLimited,
        values,
    };

    let outcome = model.solve(&solver).unwrap();
    assert_eq!(outcome.status, SolveStatus::TimeLimited);
    let timetable = model.decode(&catalog, &outcome).unwrap();
    assert!(timetable.is_enrolled(0, 0));
    assert!(timetable.is_enrolled(1, 2));
    assert!(!timetable.is_enrolled(1, 0));
    assert_eq!(timetable.room(2, 0), RoomSlot::Room("U2"));

    assert!(matches!(
        outcome.require_optimal(),
        Err(ScheduleError::SolverTimeout { .. })
    ));
}

#[test]
fn test_write_results() {
    let catalog = create_simple_problem();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    let outcome = model.solve(&GoodLpSolver).unwrap();
    let timetable = model.decode(&catalog, &outcome).unwrap();

    let mut buffer = Vec::<u8>::new();
    crate::io::simple::write(&mut buffer, &timetable, &outcome).unwrap();
    let data: serde_json::Value = serde_json::from_reader(&buffer[..]).unwrap();
    assert_eq!(data["format"], "X-timetable-simple");
    assert_eq!(data["status"], "optimal");
    assert_eq!(data["students"].as_array().unwrap().len(), 2);
    assert_eq!(data["students"][0]["schedule"].as_array().unwrap().len(), 2);
    assert_eq!(data["periods"].as_array().unwrap().len(), 2);
    let filler = data["students"][0]["schedule"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["course"] == "Empty")
        .unwrap();
    // Courses without a teacher are written as an empty string, not null
    assert_eq!(filler["teacher"], "");

    let text = crate::io::format_student_schedule(&timetable, 0);
    assert!(text.starts_with("Anton Tester (grade 9)\n"));
    assert!(text.contains("Drama | Room: U"));
    assert!(text.contains("Empty | Room: N/A | Teacher: \n"));

    let dir = tempfile::tempdir().unwrap();
    let written = crate::io::write_student_schedules(dir.path(), &timetable).unwrap();
    assert_eq!(written.len(), 2);
    assert!(dir.path().join("Tester_Anton_schedule.txt").exists());
    assert!(dir.path().join("Tester_Berta_schedule.txt").exists());
}

#[test]
fn test_skip_schedule_without_grade() {
    let catalog = Catalog::new(
        vec![course("Math", 10), course("Empty", 99)],
        vec![student("Anton", Some(9)), student("Berta", None)],
        &[],
        vec![room("U1", RoomClass::General)],
        periods(&[1, 2]),
        array![[1.0, 0.0], [1.0, 0.0]],
        vec![],
    )
    .unwrap();
    let model = TimetableModel::build(&catalog, &[], &ModelConfig::default()).unwrap();
    let outcome = model.solve(&GoodLpSolver).unwrap();
    let timetable = model.decode(&catalog, &outcome).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let written = crate::io::write_student_schedules(dir.path(), &timetable).unwrap();
    assert_eq!(written, vec![dir.path().join("Tester_Anton_schedule.txt")]);
}
