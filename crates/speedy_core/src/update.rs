use engine_logging::{engine_warn, BATCH_TARGET};

use crate::{BatchRegistry, Effect, Msg, Notice, Settlement, SizeDecision, SubmitStats, Submission};

/// Pure update function: applies a message to the registry and returns any effects.
pub fn update(mut registry: BatchRegistry, msg: Msg) -> (BatchRegistry, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSubmitted(files) => {
            if files.is_empty() {
                return (registry, Vec::new());
            }
            let mut stats = SubmitStats::default();
            let mut effects = Vec::with_capacity(files.len());
            for file in files {
                let id = match registry.submit(file) {
                    Submission::Accepted(id) => id,
                    Submission::Duplicate(_) => {
                        stats.duplicates += 1;
                        continue;
                    }
                };
                stats.accepted += 1;
                match registry.start_conversion(&id) {
                    Ok(request) => effects.push(Effect::Convert {
                        id: request.id,
                        bytes: request.bytes,
                    }),
                    Err(err) => {
                        engine_warn!(target: BATCH_TARGET, "Could not schedule {}: {}", id, err)
                    }
                }
            }
            registry.set_last_submit(stats);
            effects
        }
        Msg::JobSettled { id, result } => match registry.on_job_settled(&id, result) {
            Ok(Settlement::Converted(SizeDecision::UseOriginal)) => {
                vec![Effect::Notify(Notice::NotOptimal {
                    name: id.name().to_string(),
                })]
            }
            // Rejected settlements are already logged by the registry.
            Ok(_) | Err(_) => Vec::new(),
        },
        Msg::ArchiveClicked => {
            if registry.is_busy() {
                Vec::new()
            } else if !registry.has_eligible() {
                vec![Effect::Notify(Notice::NothingToBundle)]
            } else {
                vec![Effect::BuildArchive]
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (registry, effects)
}
