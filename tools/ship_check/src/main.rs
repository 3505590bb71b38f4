use resume_core::storage::file::FileStore;
use resume_core::track::manager::load_step_artifacts;
use resume_core::track::steps::load_step_catalog;
use resume_core::track::submission::{
    evaluate_ship_gate, final_submission_text, link_validity, load_checklist, load_links,
    proof_checklist_items, ShipGateInputs,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: ship_check <path/to/store_dir>");
        std::process::exit(2);
    }
    let store = match FileStore::open(&args[1]) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("failed to open store {}: {}", args[1], e);
            std::process::exit(2);
        }
    };
    let catalog = match load_step_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("step catalog error: {}", e);
            std::process::exit(2);
        }
    };
    let inputs = match assemble_inputs(&store, &catalog) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("failed to read ship state: {}", e);
            std::process::exit(2);
        }
    };

    for step in &catalog {
        let present = inputs.step_artifacts.get(&step.id).copied().unwrap_or(false);
        println!(
            "STEP {} {} {}",
            step.id,
            if present { "DONE" } else { "MISSING" },
            step.name
        );
    }
    for item in proof_checklist_items() {
        let checked = inputs.checklist.get(&item.key).unwrap_or(false);
        println!(
            "PROOF {} {}",
            if checked { "DONE" } else { "MISSING" },
            item.key
        );
    }
    let validity = link_validity(&inputs.links);
    println!("LINK lovable {}", if validity.lovable { "VALID" } else { "INVALID" });
    println!("LINK github {}", if validity.github { "VALID" } else { "INVALID" });
    println!("LINK deploy {}", if validity.deploy { "VALID" } else { "INVALID" });

    let outcome = evaluate_ship_gate(&inputs);
    let status = serde_json::json!({
        "shipped": outcome.is_ok(),
        "block_reason": outcome.err().map(|r| format!("{:?}", r)),
        "link_validity": validity,
    });
    println!("{}", serde_json::to_string_pretty(&status).unwrap());

    match outcome {
        Ok(()) => {
            println!("{}", final_submission_text(&inputs.links));
        }
        Err(_) => {
            std::process::exit(1);
        }
    }
}

fn assemble_inputs(
    store: &FileStore,
    catalog: &[resume_core::track::steps::StepDefinition],
) -> resume_core::error::CoreResult<ShipGateInputs> {
    Ok(ShipGateInputs {
        step_artifacts: load_step_artifacts(store, catalog)?,
        checklist: load_checklist(store)?,
        links: load_links(store)?,
    })
}
