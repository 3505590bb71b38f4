use resume_core::resume::ats::{evaluate_rules, score_resume, MAX_SCORE};
use resume_core::resume::migration;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: ats_report <path/to/resume.json> [--min-score <0-100>]");
        std::process::exit(2);
    }
    let path = std::path::Path::new(&args[1]);
    let mut min_score: u32 = 0;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--min-score" => {
                let Some(raw) = args.get(i + 1) else {
                    eprintln!("--min-score requires a value");
                    std::process::exit(2);
                };
                min_score = match raw.parse::<u32>() {
                    Ok(n) if n <= MAX_SCORE => n,
                    _ => {
                        eprintln!("invalid --min-score: {}", raw);
                        std::process::exit(2);
                    }
                };
                i += 2;
            }
            other => {
                eprintln!("unknown argument: {}", other);
                std::process::exit(2);
            }
        }
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("failed to read {}: {}", path.display(), e);
            std::process::exit(2);
        }
    };
    let (record, migrated) = match migration::parse_record(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("failed to parse resume record: {}", e);
            std::process::exit(2);
        }
    };

    let report = score_resume(&record);
    println!(
        "ATS_REPORT score={}/{} migrated={}",
        report.score, MAX_SCORE, migrated
    );
    for outcome in evaluate_rules(&record) {
        if outcome.satisfied {
            println!("CHECK {} PASS +{}", outcome.rule_id, outcome.points);
        } else {
            println!("CHECK {} MISS {}", outcome.rule_id, outcome.suggestion);
        }
    }
    println!("{}", serde_json::to_string_pretty(&report).unwrap());

    if report.score < min_score {
        std::process::exit(1);
    }
}
