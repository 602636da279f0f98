//! IO functionality for reading the school's input tables from CSV files.
//!
//! All tables have a header row. Columns are looked up by their header name, so the column order
//! of the course, teacher and roster tables does not matter. The preference and proximity tables
//! are matrices: their first column holds a row label and is ignored.

use crate::catalog::{Subject, TeacherAssignment};
use crate::{Course, Result, RoomType, ScheduleError, Student};
use csv::{ReaderBuilder, StringRecord};
use log::debug;

/// A CSV table with trimmed header names
struct Table {
    name: &'static str,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl Table {
    fn read<R: std::io::Read>(reader: R, name: &'static str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();
        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            // Skip completely blank lines
            if record.iter().all(|v| v.is_empty()) {
                continue;
            }
            records.push(record);
        }
        debug!("Read {} rows from {}", records.len(), name);
        Ok(Table {
            name,
            headers,
            records,
        })
    }

    /// Position of the column with the given header
    fn column(&self, header: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == header)
            .ok_or_else(|| {
                ScheduleError::Schema(format!("No '{}' column found in {}", header, self.name))
            })
    }

    /// Position of the column with the given header, if it exists
    fn optional_column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Check that every row has as many cells as the header row
    fn check_row_lengths(&self) -> Result<()> {
        for record in self.records.iter() {
            if record.len() != self.headers.len() {
                return Err(ScheduleError::InconsistentSize {
                    what: format!("cells in a row of {}", self.name),
                    expected: self.headers.len(),
                    found: record.len(),
                });
            }
        }
        Ok(())
    }
}

/// Content of a cell; missing trailing cells are read as empty
fn cell(record: &StringRecord, column: usize) -> &str {
    record.get(column).unwrap_or("")
}

fn schema_error(table: &str, row: usize, column: &str, value: &str) -> ScheduleError {
    ScheduleError::Schema(format!(
        "Could not parse '{}' in column '{}' of {}, row {}",
        value,
        column,
        table,
        row + 1
    ))
}

/// Parse an integral number. Spreadsheet exports sometimes write integers as "3.0".
fn parse_integer(value: &str) -> Option<u32> {
    if let Ok(v) = value.parse::<u32>() {
        return Some(v);
    }
    match value.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Some(v as u32),
        _ => None,
    }
}

/// Parse a yes/no cell. Empty cells are `false`.
fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "" | "0" | "0.0" | "false" | "no" | "n" => Some(false),
        "1" | "1.0" | "true" | "yes" | "y" => Some(true),
        _ => None,
    }
}

/// Parse a list of grades, separated by commas, semicolons or whitespace
fn parse_grades(value: &str) -> Option<Vec<u32>> {
    value
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|v| !v.is_empty())
        .map(parse_integer)
        .collect()
}

/// Read the course table.
///
/// Expected columns: `Course Name`, `Double Period`, `Max`, `Min`, `Required Grades`,
/// `Number of Instances` and `Room Type`. `Min` and `Required Grades` may be omitted. Empty cells
/// are read as "not double period", no minimum size, no required grades, a single instance and no
/// room requirement.
pub fn read_courses<R: std::io::Read>(reader: R) -> Result<Vec<Course>> {
    const TABLE: &str = "course table";
    let table = Table::read(reader, TABLE)?;
    let name_col = table.column("Course Name")?;
    let double_col = table.column("Double Period")?;
    let max_col = table.column("Max")?;
    let min_col = table.optional_column("Min");
    let grades_col = table.optional_column("Required Grades");
    let instances_col = table.column("Number of Instances")?;
    let room_col = table.column("Room Type")?;

    let mut courses = Vec::new();
    for (row, record) in table.records.iter().enumerate() {
        let name = cell(record, name_col);
        if name.is_empty() {
            return Err(schema_error(TABLE, row, "Course Name", name));
        }
        let double = cell(record, double_col);
        let double_period =
            parse_flag(double).ok_or_else(|| schema_error(TABLE, row, "Double Period", double))?;
        let max = cell(record, max_col);
        let num_max =
            parse_integer(max).ok_or_else(|| schema_error(TABLE, row, "Max", max))? as usize;
        let num_min = match min_col.map(|c| cell(record, c)) {
            None | Some("") => 0,
            Some(min) => {
                parse_integer(min).ok_or_else(|| schema_error(TABLE, row, "Min", min))? as usize
            }
        };
        let required_grades = match grades_col.map(|c| cell(record, c)) {
            None => Vec::new(),
            Some(grades) => parse_grades(grades)
                .ok_or_else(|| schema_error(TABLE, row, "Required Grades", grades))?,
        };
        let instances = match cell(record, instances_col) {
            "" => 1,
            value => parse_integer(value)
                .ok_or_else(|| schema_error(TABLE, row, "Number of Instances", value))?,
        };
        let room = cell(record, room_col);
        let room_type =
            RoomType::parse(room).ok_or_else(|| schema_error(TABLE, row, "Room Type", room))?;

        courses.push(Course {
            index: courses.len(),
            name: name.to_owned(),
            double_period,
            num_min,
            num_max,
            room_type,
            instances,
            required_grades,
        });
    }
    Ok(courses)
}

/// Read the teacher table with columns `Teacher Name` and `Course Name`
pub fn read_teacher_assignments<R: std::io::Read>(reader: R) -> Result<Vec<TeacherAssignment>> {
    const TABLE: &str = "teacher table";
    let table = Table::read(reader, TABLE)?;
    let teacher_col = table.column("Teacher Name")?;
    let course_col = table.column("Course Name")?;

    let mut assignments = Vec::new();
    for (row, record) in table.records.iter().enumerate() {
        let teacher = cell(record, teacher_col);
        if teacher.is_empty() {
            return Err(schema_error(TABLE, row, "Teacher Name", teacher));
        }
        let course = cell(record, course_col);
        if course.is_empty() {
            return Err(schema_error(TABLE, row, "Course Name", course));
        }
        assignments.push(TeacherAssignment {
            teacher: teacher.to_owned(),
            course: course.to_owned(),
        });
    }
    Ok(assignments)
}

/// Read the roster with columns `first_name`, `last_name` and `grade`. Empty grade cells are read
/// as "grade unknown".
pub fn read_roster<R: std::io::Read>(reader: R) -> Result<Vec<Student>> {
    const TABLE: &str = "roster";
    let table = Table::read(reader, TABLE)?;
    let first_col = table.column("first_name")?;
    let last_col = table.column("last_name")?;
    let grade_col = table.column("grade")?;

    let mut students = Vec::new();
    for (row, record) in table.records.iter().enumerate() {
        let grade = match cell(record, grade_col) {
            "" => None,
            value => Some(
                parse_integer(value).ok_or_else(|| schema_error(TABLE, row, "grade", value))?,
            ),
        };
        students.push(Student {
            index: students.len(),
            first_name: cell(record, first_col).to_owned(),
            last_name: cell(record, last_col).to_owned(),
            grade,
        });
    }
    Ok(students)
}

/// Read a numeric matrix, skipping the label column. Returns the headers of the value columns and
/// the matrix.
fn read_matrix(table: &Table) -> Result<(Vec<String>, ndarray::Array2<f64>)> {
    if table.headers.is_empty() {
        return Err(ScheduleError::Schema(format!(
            "No label column found in {}",
            table.name
        )));
    }
    table.check_row_lengths()?;
    let columns = table.headers.len() - 1;
    let mut matrix = ndarray::Array2::zeros((table.records.len(), columns));
    for (row, record) in table.records.iter().enumerate() {
        for column in 0..columns {
            let value = cell(record, column + 1);
            matrix[[row, column]] = if value.is_empty() {
                0.0
            } else {
                value.parse::<f64>().map_err(|_| {
                    schema_error(table.name, row, &table.headers[column + 1], value)
                })?
            };
        }
    }
    Ok((table.headers[1..].to_vec(), matrix))
}

/// Read the preference matrix: one row per student (in roster order), a label column and one
/// column per course (in course table order). Empty cells are read as 0.
pub fn read_preferences<R: std::io::Read>(reader: R) -> Result<ndarray::Array2<f64>> {
    let table = Table::read(reader, "preference table")?;
    let (_, matrix) = read_matrix(&table)?;
    Ok(matrix)
}

/// Read the proximity table: one row per course (in course table order), a label column and one
/// column per subject, holding the course's membership weight for that subject.
pub fn read_proximity<R: std::io::Read>(reader: R) -> Result<Vec<Subject>> {
    let table = Table::read(reader, "proximity table")?;
    let (names, matrix) = read_matrix(&table)?;
    Ok(names
        .into_iter()
        .zip(matrix.columns())
        .map(|(name, weights)| Subject {
            name,
            weights: weights.to_owned(),
        })
        .collect())
}
