//! BatchJob Custom Resource Definition.
//!
//! Defines the BatchJob CRD: a batch workload made of one or more task
//! groups, with lifecycle policies mapping job/pod events (or container exit
//! codes) to corrective actions, and volume mounts backed by persistent
//! volume claims.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// BatchJob is a custom resource for running batch workloads.
///
/// Example:
/// ```yaml
/// apiVersion: batchoperator.io/v1alpha1
/// kind: BatchJob
/// metadata:
///   name: training-run
/// spec:
///   minAvailable: 2
///   queue: default
///   tasks:
///     - name: worker
///       replicas: 4
///   policies:
///     - event: PodEvicted
///       action: RestartJob
///   volumes:
///     - mountPath: /data
///       volumeClaimName: training-data
/// ```
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "batchoperator.io",
    version = "v1alpha1",
    kind = "BatchJob",
    plural = "batchjobs",
    shortname = "bj",
    status = "JobStatus",
    namespaced,
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"MinAvailable", "type":"integer", "jsonPath":".spec.minAvailable"}"#,
    printcolumn = r#"{"name":"Queue", "type":"string", "jsonPath":".spec.queue"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Minimum number of pods that must be running for the job to be
    /// considered scheduled (default 1).
    #[serde(default = "default_min_available")]
    pub min_available: i32,

    /// Queue the job is submitted to (default "default").
    #[serde(default = "default_queue")]
    pub queue: String,

    /// Maximum number of job retries before giving up (default 3).
    #[serde(default = "default_max_retry")]
    pub max_retry: i32,

    /// Task groups that make up the job.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,

    /// Job-level lifecycle policies, applied when no task-level policy
    /// matches.
    #[serde(default)]
    pub policies: Vec<LifecyclePolicy>,

    /// Volumes mounted into every task pod.
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
}

impl Default for JobSpec {
    fn default() -> Self {
        Self {
            min_available: default_min_available(),
            queue: default_queue(),
            max_retry: default_max_retry(),
            tasks: Vec::new(),
            policies: Vec::new(),
            volumes: Vec::new(),
        }
    }
}

fn default_min_available() -> i32 {
    1
}

fn default_queue() -> String {
    "default".to_string()
}

fn default_max_retry() -> i32 {
    3
}

/// A group of identical pods within a BatchJob.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Task name, unique within the job.
    pub name: String,

    /// Number of replicas for this task (default 1).
    #[serde(default = "default_task_replicas")]
    pub replicas: i32,

    /// Task-level lifecycle policies. These take precedence over job-level
    /// policies for pods of this task.
    #[serde(default)]
    pub policies: Vec<LifecyclePolicy>,
}

fn default_task_replicas() -> i32 {
    1
}

/// A lifecycle policy maps a triggering condition to a corrective action.
///
/// Exactly one of the event fields (`event`/`events`) or `exitCode` must be
/// set; the admission webhook rejects any other combination.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LifecyclePolicy {
    /// Single triggering event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,

    /// Multiple triggering events. Merged with `event` and de-duplicated
    /// before evaluation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,

    /// Container exit code that triggers the policy. Mutually exclusive
    /// with the event fields; 0 is not accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Action taken when the policy fires.
    #[serde(default)]
    pub action: Action,
}

/// Events that can trigger a lifecycle policy.
///
/// `OutOfSync` and `CommandIssued` are produced internally by the controller
/// and are not accepted in user-submitted policies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum Event {
    /// Wildcard: matches every event. Must not be combined with any other
    /// event rule in the same job.
    Any,
    /// A pod of the job failed.
    PodFailed,
    /// A pod of the job was evicted.
    PodEvicted,
    /// The job entered an unknown state (e.g., partially running).
    JobUnknown,
    /// A task finished all its pods successfully.
    TaskCompleted,
    /// Internal: controller detected drift between spec and cluster state.
    OutOfSync,
    /// Internal: a command was issued against the job.
    CommandIssued,
}

impl Event {
    /// All variants, in declaration order.
    pub const ALL: [Event; 7] = [
        Event::Any,
        Event::PodFailed,
        Event::PodEvicted,
        Event::JobUnknown,
        Event::TaskCompleted,
        Event::OutOfSync,
        Event::CommandIssued,
    ];

    /// Whether this event may appear in a user-submitted policy.
    pub fn allowed_in_spec(self) -> bool {
        match self {
            Event::Any
            | Event::PodFailed
            | Event::PodEvicted
            | Event::JobUnknown
            | Event::TaskCompleted => true,
            Event::OutOfSync | Event::CommandIssued => false,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Any => write!(f, "Any"),
            Event::PodFailed => write!(f, "PodFailed"),
            Event::PodEvicted => write!(f, "PodEvicted"),
            Event::JobUnknown => write!(f, "JobUnknown"),
            Event::TaskCompleted => write!(f, "TaskCompleted"),
            Event::OutOfSync => write!(f, "OutOfSync"),
            Event::CommandIssued => write!(f, "CommandIssued"),
        }
    }
}

/// Actions a lifecycle policy can take.
///
/// `SyncJob` and `Enqueue` are internal controller actions and are not
/// accepted in user-submitted policies.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum Action {
    /// Abort the job: kill all pods, keep the job for inspection.
    AbortJob,
    /// Restart the whole job.
    #[default]
    RestartJob,
    /// Restart only the affected task.
    RestartTask,
    /// Terminate the job: kill all pods, mark the job terminated.
    TerminateJob,
    /// Mark the job completed.
    CompleteJob,
    /// Resume an aborted job.
    ResumeJob,
    /// Internal: reconcile the job's pods with its spec.
    SyncJob,
    /// Internal: re-enqueue the job for scheduling.
    Enqueue,
}

impl Action {
    /// All variants, in declaration order.
    pub const ALL: [Action; 8] = [
        Action::AbortJob,
        Action::RestartJob,
        Action::RestartTask,
        Action::TerminateJob,
        Action::CompleteJob,
        Action::ResumeJob,
        Action::SyncJob,
        Action::Enqueue,
    ];

    /// Whether this action may appear in a user-submitted policy.
    pub fn allowed_in_spec(self) -> bool {
        match self {
            Action::AbortJob
            | Action::RestartJob
            | Action::RestartTask
            | Action::TerminateJob
            | Action::CompleteJob
            | Action::ResumeJob => true,
            Action::SyncJob | Action::Enqueue => false,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::AbortJob => write!(f, "AbortJob"),
            Action::RestartJob => write!(f, "RestartJob"),
            Action::RestartTask => write!(f, "RestartTask"),
            Action::TerminateJob => write!(f, "TerminateJob"),
            Action::CompleteJob => write!(f, "CompleteJob"),
            Action::ResumeJob => write!(f, "ResumeJob"),
            Action::SyncJob => write!(f, "SyncJob"),
            Action::Enqueue => write!(f, "Enqueue"),
        }
    }
}

/// A volume mounted into every pod of the job.
///
/// Exactly one of `volumeClaim` (create a new PVC from an inline template)
/// or `volumeClaimName` (reference an existing PVC) must be set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSpec {
    /// Path inside the container where the volume is mounted. Required and
    /// unique across the job's volumes.
    pub mount_path: String,

    /// Name of an existing PersistentVolumeClaim to mount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_claim_name: Option<String>,

    /// Inline template for a PersistentVolumeClaim created with the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_claim: Option<VolumeClaimSpec>,
}

/// Inline PersistentVolumeClaim template.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeClaimSpec {
    /// Storage class for the claim. If not set, the cluster default is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,

    /// Access modes requested for the claim (default ReadWriteOnce).
    #[serde(default = "default_access_modes")]
    pub access_modes: Vec<String>,

    /// Requested storage size (default 1Gi).
    #[serde(default = "default_claim_size")]
    pub size: String,
}

impl Default for VolumeClaimSpec {
    fn default() -> Self {
        Self {
            storage_class_name: None,
            access_modes: default_access_modes(),
            size: default_claim_size(),
        }
    }
}

fn default_access_modes() -> Vec<String> {
    vec!["ReadWriteOnce".to_string()]
}

fn default_claim_size() -> String {
    "1Gi".to_string()
}

/// Status of a BatchJob.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// Current phase of the job lifecycle.
    #[serde(default)]
    pub phase: JobPhase,

    /// Number of running pods.
    #[serde(default)]
    pub running: i32,

    /// Number of succeeded pods.
    #[serde(default)]
    pub succeeded: i32,

    /// Number of failed pods.
    #[serde(default)]
    pub failed: i32,

    /// How many times the job has been retried.
    #[serde(default)]
    pub retry_count: i32,

    /// The generation most recently observed by the controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// JobPhase represents the current lifecycle phase of a BatchJob.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum JobPhase {
    /// Accepted but not yet scheduled.
    #[default]
    Pending,
    /// Pods are running.
    Running,
    /// Job is being restarted by a lifecycle policy.
    Restarting,
    /// Job was aborted by a lifecycle policy or user command.
    Aborted,
    /// All tasks completed successfully.
    Completed,
    /// Job failed and exhausted its retries.
    Failed,
    /// Job was terminated by a lifecycle policy or user command.
    Terminated,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Pending => write!(f, "Pending"),
            JobPhase::Running => write!(f, "Running"),
            JobPhase::Restarting => write!(f, "Restarting"),
            JobPhase::Aborted => write!(f, "Aborted"),
            JobPhase::Completed => write!(f, "Completed"),
            JobPhase::Failed => write!(f, "Failed"),
            JobPhase::Terminated => write!(f, "Terminated"),
        }
    }
}
