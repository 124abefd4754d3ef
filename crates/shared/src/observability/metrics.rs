//! 徽章引擎指标
//!
//! 基于 metrics 门面记录业务指标，具体的 recorder（如 Prometheus）由宿主应用安装。
//! 未安装 recorder 时所有记录均为空操作。

/// 注册引擎指标描述
///
/// 这些描述会出现在导出端的 HELP 注释中
pub fn describe_engine_metrics() {
    metrics::describe_counter!(
        "badge_evaluations_total",
        "Total number of badge evaluation runs"
    );
    metrics::describe_histogram!(
        "badge_evaluation_duration_seconds",
        "Badge evaluation duration in seconds"
    );
    metrics::describe_counter!("badges_earned_total", "Total number of badges earned");
    metrics::describe_counter!(
        "badge_counter_write_failures_total",
        "Counter writes dropped because of store errors"
    );
}

/// 记录一次徽章评估
#[inline]
pub fn record_badge_evaluation(status: &str, newly_earned: usize, duration_secs: f64) {
    metrics::counter!("badge_evaluations_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("badge_evaluation_duration_seconds", "status" => status.to_string())
        .record(duration_secs);
    if newly_earned > 0 {
        metrics::counter!("badges_earned_total").increment(newly_earned as u64);
    }
}

/// 记录被丢弃的计数器写入
#[inline]
pub fn record_counter_write_failure(counter: &str) {
    metrics::counter!(
        "badge_counter_write_failures_total",
        "counter" => counter.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        describe_engine_metrics();
        record_badge_evaluation("success", 2, 0.01);
        record_counter_write_failure("bingeWindows");
    }
}
