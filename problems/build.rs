//! Generates the `Problem` enumeration from `resources/problem-codes.csv`.
//!
//! Each record has a code (stable, documented to users), a name (the
//! variant name, free to change between releases) and a constant message.
use std::{
    collections::HashSet,
    env,
    error::Error,
    fmt::Write as _,
    fs,
    path::PathBuf,
    process,
};

struct ProblemDef {
    code: String,
    name: String,
    message: String,
}

impl ProblemDef {
    fn from_record(record: &csv::StringRecord) -> Result<Self, String> {
        let column = |index: usize| {
            record
                .get(index)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| format!("Record {:?} has no value at column {}", record, index))
        };
        let def = ProblemDef {
            code: column(0)?,
            name: column(1)?,
            message: column(2)?,
        };

        // G is a generation problem and V a validation problem.
        let mut chars = def.code.chars();
        let family = chars.next();
        let digits: String = chars.collect();
        if !matches!(family, Some('G') | Some('V'))
            || digits.len() != 4
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(format!("Code {} is not of the form G0000 or V0000", def.code));
        }
        Ok(def)
    }
}

fn read_defs() -> Result<Vec<ProblemDef>, Box<dyn Error>> {
    let mut src_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    src_path.push("resources");
    src_path.push("problem-codes.csv");

    let mut rdr = csv::Reader::from_path(&src_path)
        .map_err(|e| format!("Unable to read {}: {}", src_path.display(), e))?;

    let mut codes = HashSet::new();
    let mut names = HashSet::new();
    let mut defs = vec![];
    for result in rdr.records() {
        let def = ProblemDef::from_record(&result?)?;
        if !codes.insert(def.code.clone()) {
            return Err(format!("Code {} is defined more than once", def.code).into());
        }
        if !names.insert(def.name.clone()) {
            return Err(format!("Name {} is defined more than once", def.name).into());
        }
        defs.push(def);
    }
    Ok(defs)
}

fn render(defs: &[ProblemDef]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]")?;
    writeln!(out, "pub enum Problem {{")?;
    for def in defs {
        writeln!(out, "    /// {}: {}", def.code, def.message)?;
        writeln!(out, "    {},", def.name)?;
    }
    writeln!(out, "}}\n")?;

    writeln!(out, "impl Problem {{")?;

    writeln!(out, "    /// Every problem in code order of the definition file.")?;
    writeln!(out, "    pub const ALL: &'static [Problem] = &[")?;
    for def in defs {
        writeln!(out, "        Problem::{},", def.name)?;
    }
    writeln!(out, "    ];\n")?;

    writeln!(out, "    /// Returns the code for the particular problem as a string.")?;
    writeln!(out, "    pub fn code(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for def in defs {
        writeln!(out, "            Problem::{} => {:?},", def.name, def.code)?;
    }
    writeln!(out, "        }}\n    }}\n")?;

    writeln!(out, "    /// Returns the message for the particular problem as a string.")?;
    writeln!(
        out,
        "    /// The message is constant and does not depend on the particular instance of the problem."
    )?;
    writeln!(out, "    pub fn message(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for def in defs {
        writeln!(out, "            Problem::{} => {:?},", def.name, def.message)?;
    }
    writeln!(out, "        }}\n    }}")?;

    writeln!(out, "}}")?;
    Ok(out)
}

fn create_problems() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=resources/problem-codes.csv");

    let defs = read_defs()?;
    let text = render(&defs)?;

    let mut out_path = PathBuf::from(env::var("OUT_DIR")?);
    out_path.push("problems.rs");
    fs::write(&out_path, text)
        .map_err(|e| format!("Unable to create {}: {}", out_path.display(), e))?;

    Ok(())
}

fn main() {
    if let Err(err) = create_problems() {
        println!("problem generating problems.rs: {}", err);
        process::exit(1);
    }
}
