//! Built-in staffing dataset: personas, per-project weekly allocation and
//! phase totals, and the cross-project summaries.

use crate::model::{Cell, Dataset, Sheet};

macro_rules! row {
    ($($cell:expr),* $(,)?) => {
        vec![$(Cell::from($cell)),*]
    };
}

fn sheet(name: &str, rows: Vec<Vec<Cell>>) -> Sheet {
    Sheet {
        name: name.to_string(),
        rows,
    }
}

/// The ten staffing sheets, in workbook order.
pub fn staffing_dataset() -> Dataset {
    Dataset {
        sheets: vec![
            personas(),
            infrastructure_weekly(),
            infrastructure_phases(),
            use_cases_weekly(),
            use_cases_phases(),
            migration_weekly(),
            migration_phases(),
            project_summary(),
            peak_utilization(),
            workload_distribution(),
        ],
    }
}

fn personas() -> Sheet {
    sheet(
        "Personas",
        vec![
            row!["Persona Type", "Skill Level", "Standard Days/Week", "Notes"],
            row!["Infrastructure Architect", "Senior", 5, "Part-time (2.5 days) during Implementation"],
            row!["Solution Architect", "Senior", 5, "Full-time during active phases"],
            row!["Migration Specialist", "Senior", 5, "Full-time throughout migration project"],
            row!["DevOps Engineer", "Mid-Senior", 5, "Multiple resources (2x)"],
            row!["Security Engineer", "Senior", 5, "Full-time during active phases"],
            row!["Network Engineer", "Senior", 5, "Full-time during active phases"],
            row!["Security Specialist", "Senior", 5, "Full-time during active phases"],
            row!["Application Owner", "Mid-Senior", 5, "Multiple resources (2x)"],
            row!["Performance Engineer", "Mid-Senior", 5, "Full-time during active phases"],
            row!["Business Analyst", "Mid-Senior", 5, "Full-time during active phases"],
            row!["RH OVE Engineer", "Mid-Senior", 5, "Multiple resources (2x)"],
            row!["Application Developer", "Mid-Level", 5, "Multiple resources (3x)"],
            row!["System Administrator", "Mid-Level", 5, "Multiple resources (2x)"],
            row!["Testing Specialist", "Mid-Level", 5, "Full-time during active phases"],
            row!["VMware Administrator", "Mid-Level", 5, "Multiple resources (2x)"],
            row!["Backup Administrator", "Mid-Level", 5, "Full-time during active phases"],
        ],
    )
}

fn infrastructure_weekly() -> Sheet {
    sheet(
        "Infrastructure Weekly",
        vec![
            row![
                "Week",
                "Phase",
                "Infrastructure Architect",
                "DevOps Engineer (2x)",
                "System Administrator (2x)",
                "Security Engineer",
                "Network Engineer",
                "Weekly Total (Days)",
            ],
            row!["1-4", "Study", 5, 0, 0, 0, 5, 10],
            row!["5-12", "Design", 5, 10, 0, 5, 5, 25],
            row!["13-20", "Implementation", 2.5, 10, 10, 5, 5, 32.5],
            row!["21-24", "Testing", 0, 10, 10, 5, 0, 25],
            row!["25-28", "Day-2 Ops", 0, 10, 10, 0, 0, 20],
        ],
    )
}

fn infrastructure_phases() -> Sheet {
    sheet(
        "Infrastructure Phases",
        vec![
            row!["Phase", "Weeks", "Person-Days"],
            row!["Study Phase", "1-4", 40],
            row!["Design Phase", "5-12", 200],
            row!["Implementation Phase", "13-20", 260],
            row!["Testing Phase", "21-24", 100],
            row!["Day-2 Operations", "25-28", 80],
            row!["TOTAL", "", 680],
        ],
    )
}

fn use_cases_weekly() -> Sheet {
    sheet(
        "Use-Cases Weekly",
        vec![
            row![
                "Week",
                "Phase",
                "Solution Architect",
                "Application Developer (3x)",
                "Testing Specialist",
                "DevOps Engineer",
                "Security Specialist",
                "Business Analyst",
                "Weekly Total (Days)",
            ],
            row!["15-18", "Study", 5, 0, 0, 0, 0, 5, 10],
            row!["19-26", "Design", 5, 0, 0, 0, 5, 5, 15],
            row!["27-38", "Implementation", 0, 15, 0, 5, 5, 0, 25],
            row!["39-42", "Testing", 0, 15, 5, 5, 5, 0, 30],
            row!["43-46", "Day-2 Ops", 0, 0, 0, 5, 0, 0, 5],
        ],
    )
}

fn use_cases_phases() -> Sheet {
    sheet(
        "Use-Cases Phases",
        vec![
            row!["Phase", "Weeks", "Person-Days"],
            row!["Study Phase", "15-18", 40],
            row!["Design Phase", "19-26", 120],
            row!["Implementation Phase", "27-38", 300],
            row!["Testing Phase", "39-42", 120],
            row!["Day-2 Operations", "43-46", 20],
            row!["TOTAL", "", 600],
        ],
    )
}

fn migration_weekly() -> Sheet {
    sheet(
        "Migration Weekly",
        vec![
            row![
                "Week",
                "Phase",
                "Migration Specialist",
                "VMware Admin (2x)",
                "RH OVE Engineer (2x)",
                "Application Owner (2x)",
                "Performance Engineer",
                "Backup Administrator",
                "Weekly Total (Days)",
            ],
            row!["21-28", "Study", 5, 10, 0, 0, 0, 0, 15],
            row!["29-36", "Design", 5, 10, 0, 10, 0, 0, 25],
            row!["37-50", "Implementation", 5, 10, 10, 10, 5, 5, 45],
            row!["51-54", "Testing", 5, 0, 10, 10, 5, 5, 35],
            row!["55-60", "Day-2 Ops", 5, 0, 10, 0, 5, 5, 25],
        ],
    )
}

fn migration_phases() -> Sheet {
    sheet(
        "Migration Phases",
        vec![
            row!["Phase", "Weeks", "Person-Days"],
            row!["Study Phase", "21-28", 120],
            row!["Design Phase", "29-36", 200],
            row!["Implementation Phase", "37-50", 630],
            row!["Testing Phase", "51-54", 140],
            row!["Day-2 Operations", "55-60", 150],
            row!["TOTAL", "", 1240],
        ],
    )
}

fn project_summary() -> Sheet {
    sheet(
        "Project Summary",
        vec![
            row![
                "Sub-Project",
                "Duration (Weeks)",
                "Total Workload (Person-Days)",
                "Average Weekly Workload (Days)",
            ],
            row!["RH OVE Infrastructure", 28, 582.5, 20.8],
            row!["Use-Cases Implementation", 32, 560, 17.5],
            row!["Migration from VMware", 40, 869, 21.7],
            row!["TOTAL", 100, 2011.5, 60.0],
        ],
    )
}

fn peak_utilization() -> Sheet {
    sheet(
        "Peak Utilization",
        vec![
            row!["Week Range", "Projects Active", "Weekly Workload (Days)", "Key Activities"],
            row!["37-42", "Infrastructure + Use-Cases + Migration", 102.5, "Implementation overlap"],
            row!["43-46", "Use-Cases + Migration", 30, "Testing phases"],
            row!["47-50", "Migration Implementation", 45, "Critical migration waves"],
        ],
    )
}

fn workload_distribution() -> Sheet {
    sheet(
        "Workload Distribution",
        vec![
            row!["Persona Type", "Total Weeks Active", "Total Workload (Days)", "Percentage"],
            row!["Migration Specialist", 40, 200, 9.9],
            row!["Application Developer (3x)", 16, 240, 11.9],
            row!["RH OVE Engineer (2x)", 24, 240, 11.9],
            row!["VMware Administrator (2x)", 28, 280, 13.9],
            row!["DevOps Engineer (2x)", 36, 360, 17.9],
            row!["Infrastructure Architect", 18.5, 92.5, 4.6],
            row!["System Administrator (2x)", 16, 160, 8.0],
            row!["Security Engineer", 16, 80, 4.0],
            row!["Network Engineer", 20, 100, 5.0],
            row!["Solution Architect", 12, 60, 3.0],
            row!["Testing Specialist", 4, 20, 1.0],
            row!["Security Specialist", 12, 60, 3.0],
            row!["Business Analyst", 4, 20, 1.0],
            row!["Application Owner (2x)", 26, 260, 12.9],
            row!["Performance Engineer", 18, 90, 4.5],
            row!["Backup Administrator", 30, 150, 7.5],
        ],
    )
}
