//! `list instance-types`.

use super::Runtime;
use crate::output::{self, MachineTypeList};

pub async fn list(rt: &Runtime) -> crate::Result<()> {
    let mut types = rt.api.list_machine_types().await?;
    if types.is_empty() && rt.output.is_human() {
        rt.reporter.info("There are no machine types supported for your account");
        return Ok(());
    }
    types.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));
    rt.render(&types, || Ok(output::table(&MachineTypeList(&types))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::commands::testing::runtime;
    use crate::model::{MachineType, Quantity};

    fn machine(id: &str, category: &str, cpu: f64, gib: f64) -> MachineType {
        MachineType {
            id: id.to_string(),
            name: id.to_string(),
            category: category.to_string(),
            cpu: Quantity {
                value: cpu,
                unit: "vCPU".to_string(),
            },
            memory: Quantity {
                value: gib * 1024.0 * 1024.0 * 1024.0,
                unit: "B".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_list_sorted_by_category() {
        let api = FakeApi::new().with_machine_types(vec![
            machine("r5.xlarge", "memory_optimized", 4.0, 32.0),
            machine("m5.xlarge", "general_purpose", 4.0, 16.0),
        ]);
        let (rt, _, _) = runtime(api, &[]);

        list(&rt).await.unwrap();
        let stdout = rt.reporter.output().stdout;
        let lines: Vec<&str> = stdout.lines().collect();
        assert!(lines[0].contains("CPU_CORES") && lines[0].contains("MEMORY"));
        assert!(lines[1].contains("m5.xlarge") && lines[1].contains("16 GiB"));
        assert!(lines[2].contains("r5.xlarge") && lines[2].contains("32 GiB"));
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (rt, _, _) = runtime(FakeApi::new(), &[]);

        list(&rt).await.unwrap();
        assert_eq!(
            rt.reporter.output().stdout,
            "INFO: There are no machine types supported for your account\n"
        );
    }
}
