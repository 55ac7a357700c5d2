//! Test fixtures and builder patterns for BatchJob.

use batchjob_operator::crd::{
    BatchJob, JobSpec, LifecyclePolicy, TaskSpec, VolumeSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Builder for creating BatchJob test fixtures.
///
/// # Example
/// ```ignore
/// let job = BatchJobBuilder::new("test-job")
///     .namespace("test-ns")
///     .task("worker", 4)
///     .policy(LifecyclePolicy { .. })
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct BatchJobBuilder {
    name: String,
    namespace: Option<String>,
    min_available: i32,
    queue: String,
    tasks: Vec<TaskSpec>,
    policies: Vec<LifecyclePolicy>,
    volumes: Vec<VolumeSpec>,
}

impl BatchJobBuilder {
    /// Create a new builder with the given job name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: Some("default".to_string()),
            min_available: 1,
            queue: "default".to_string(),
            tasks: Vec::new(),
            policies: Vec::new(),
            volumes: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn min_available(mut self, min_available: i32) -> Self {
        self.min_available = min_available;
        self
    }

    pub fn queue(mut self, queue: &str) -> Self {
        self.queue = queue.to_string();
        self
    }

    pub fn task(mut self, name: &str, replicas: i32) -> Self {
        self.tasks.push(TaskSpec {
            name: name.to_string(),
            replicas,
            policies: Vec::new(),
        });
        self
    }

    pub fn task_with_policies(
        mut self,
        name: &str,
        replicas: i32,
        policies: Vec<LifecyclePolicy>,
    ) -> Self {
        self.tasks.push(TaskSpec {
            name: name.to_string(),
            replicas,
            policies,
        });
        self
    }

    pub fn policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn volume(mut self, volume: VolumeSpec) -> Self {
        self.volumes.push(volume);
        self
    }

    pub fn build(self) -> BatchJob {
        BatchJob {
            metadata: ObjectMeta {
                name: Some(self.name),
                namespace: self.namespace,
                uid: Some("test-uid".to_string()),
                ..Default::default()
            },
            spec: JobSpec {
                min_available: self.min_available,
                queue: self.queue,
                tasks: self.tasks,
                policies: self.policies,
                volumes: self.volumes,
                ..Default::default()
            },
            status: None,
        }
    }
}
