//! Which contexts and special functions an expression may use, keyed by the
//! workflow location it appears in.
//!
//! Location keys follow the "context availability" table of the GitHub
//! Actions documentation, e.g. `jobs.<job_id>.steps.if`. Special function
//! names are stored lower-cased.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

const WORKFLOW: &[&str] = &["github", "inputs", "vars"];
const WORKFLOW_SECRETS: &[&str] = &["github", "inputs", "secrets", "vars"];
const JOB: &[&str] = &["github", "inputs", "matrix", "needs", "strategy", "vars"];
const JOB_NEEDS: &[&str] = &["github", "inputs", "needs", "vars"];
const JOB_ENV: &[&str] = &[
    "env", "github", "inputs", "matrix", "needs", "strategy", "vars",
];
const JOB_SECRETS: &[&str] = &[
    "github", "inputs", "matrix", "needs", "secrets", "strategy", "vars",
];
const CREDENTIALS: &[&str] = &[
    "env", "github", "inputs", "matrix", "needs", "secrets", "strategy", "vars",
];
const STEP: &[&str] = &[
    "env", "github", "inputs", "job", "matrix", "needs", "runner", "secrets", "steps",
    "strategy", "vars",
];
const SIDECAR_ENV: &[&str] = &[
    "env", "github", "inputs", "job", "matrix", "needs", "runner", "secrets", "strategy", "vars",
];
const STEP_NO_SECRETS: &[&str] = &[
    "env", "github", "inputs", "job", "matrix", "needs", "runner", "steps", "strategy", "vars",
];
const CALL_OUTPUTS: &[&str] = &["github", "inputs", "jobs", "vars"];

const NONE: &[&str] = &[];
const STATUS: &[&str] = &["always", "cancelled", "failure", "success"];
const STATUS_HASH: &[&str] = &["always", "cancelled", "failure", "hashfiles", "success"];
const HASH: &[&str] = &["hashfiles"];

/// `(location key, contexts, special functions)`, sorted by key.
static AVAILABILITY: &[(&str, &[&str], &[&str])] = &[
    ("concurrency", WORKFLOW, NONE),
    ("env", WORKFLOW_SECRETS, NONE),
    ("jobs.<job_id>.concurrency", JOB, NONE),
    ("jobs.<job_id>.container", JOB, NONE),
    ("jobs.<job_id>.container.credentials", CREDENTIALS, NONE),
    ("jobs.<job_id>.container.env.<env_id>", SIDECAR_ENV, NONE),
    ("jobs.<job_id>.container.image", JOB, NONE),
    ("jobs.<job_id>.continue-on-error", JOB, NONE),
    ("jobs.<job_id>.defaults.run", JOB_ENV, NONE),
    ("jobs.<job_id>.env", JOB_SECRETS, NONE),
    ("jobs.<job_id>.environment", JOB, NONE),
    ("jobs.<job_id>.environment.url", STEP_NO_SECRETS, NONE),
    ("jobs.<job_id>.if", JOB_NEEDS, STATUS),
    ("jobs.<job_id>.name", JOB, NONE),
    ("jobs.<job_id>.outputs.<output_id>", STEP, NONE),
    ("jobs.<job_id>.runs-on", JOB, NONE),
    ("jobs.<job_id>.secrets.<secrets_id>", JOB_SECRETS, NONE),
    ("jobs.<job_id>.services", JOB, NONE),
    ("jobs.<job_id>.services.<service_id>.credentials", CREDENTIALS, NONE),
    ("jobs.<job_id>.services.<service_id>.env.<env_id>", SIDECAR_ENV, NONE),
    ("jobs.<job_id>.steps.continue-on-error", STEP, HASH),
    ("jobs.<job_id>.steps.env", STEP, HASH),
    ("jobs.<job_id>.steps.if", STEP_NO_SECRETS, STATUS_HASH),
    ("jobs.<job_id>.steps.name", STEP, HASH),
    ("jobs.<job_id>.steps.run", STEP, HASH),
    ("jobs.<job_id>.steps.timeout-minutes", STEP, HASH),
    ("jobs.<job_id>.steps.with", STEP, HASH),
    ("jobs.<job_id>.steps.working-directory", STEP, HASH),
    ("jobs.<job_id>.strategy", JOB_NEEDS, NONE),
    ("jobs.<job_id>.timeout-minutes", JOB, NONE),
    ("jobs.<job_id>.with.<with_id>", JOB, NONE),
    ("on.workflow_call.inputs.<inputs_id>.default", WORKFLOW, NONE),
    ("on.workflow_call.outputs.<output_id>.value", CALL_OUTPUTS, NONE),
    ("run-name", WORKFLOW, NONE),
];

/// Every location key known to the table, in sorted order.
pub fn workflow_keys() -> impl Iterator<Item = &'static str> {
    AVAILABILITY.iter().map(|(key, _, _)| *key)
}

/// Returns `(contexts, special functions)` usable at `key`. Unknown keys
/// yield two empty slices.
pub fn context_availability(key: &str) -> (&'static [&'static str], &'static [&'static str]) {
    match AVAILABILITY.binary_search_by(|(k, _, _)| (*k).cmp(key)) {
        Ok(idx) => {
            let (_, contexts, functions) = AVAILABILITY[idx];
            (contexts, functions)
        }
        Err(_) => (NONE, NONE),
    }
}

fn registry() -> &'static BTreeMap<&'static str, Vec<&'static str>> {
    static REGISTRY: OnceLock<BTreeMap<&'static str, Vec<&'static str>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
        for (key, _, functions) in AVAILABILITY {
            for f in *functions {
                map.entry(*f).or_default().push(*key);
            }
        }
        log::trace!("built special function registry with {} entries", map.len());
        map
    })
}

/// Location keys where the special function `name` may be called. The name is
/// matched ASCII case-insensitively, so `hashFiles` finds `hashfiles`.
/// Unknown functions yield an empty slice.
pub fn special_function_keys(name: &str) -> &'static [&'static str] {
    registry()
        .get(name.to_ascii_lowercase().as_str())
        .map(Vec::as_slice)
        .unwrap_or(NONE)
}

/// All registered special function names, sorted.
pub fn special_function_names() -> impl Iterator<Item = &'static str> {
    registry().keys().copied()
}

/// Whether `name` has the shape of a context or special function name.
pub fn is_valid_name(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid regex"))
        .is_match(name)
}
