//! 健康检查控制器
//!
//! 不使用宏，直接通过标注 API 声明路由，并用工厂函数构造实例

use hexagon_core::{Arguments, ControllerSubmission, Handle, Registry};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

pub struct HealthController {
    started: Instant,
}

impl HealthController {
    fn annotate(registry: &mut Registry) {
        registry.register_controller_with(|| {
            Ok(HealthController {
                started: Instant::now(),
            })
        });

        registry.annotate::<HealthController>().get(
            "status",
            "/health",
            Handle::new(|this: Arc<HealthController>, _: Arguments| async move {
                Ok::<_, anyhow::Error>(json!({
                    "status": "UP",
                    "uptimeSeconds": this.started.elapsed().as_secs(),
                }))
            }),
        );
    }
}

hexagon_core::inventory::submit! {
    ControllerSubmission {
        name: "HealthController",
        register: HealthController::annotate,
    }
}
