use super::{Extracted, first_present};
use shared::RawRecord;

pub fn crowdstrike(row: &RawRecord) -> Extracted {
    Extracted {
        id: first_present(row, &["process_id", "ProcessId"]),
        name: first_present(row, &["process_name", "FileName"]),
        command_line: first_present(row, &["command_line", "CommandLine"]),
        parent_id: first_present(row, &["parent_process_id", "ParentProcessId"]),
        parent_name: first_present(row, &["parent_process_name", "ParentBaseFileName"]),
        sha256: first_present(row, &["sha256"]),
        status: first_present(row, &["state"]),
        timestamp: first_present(row, &["timestamp"]),
    }
}

pub fn sentinelone(row: &RawRecord) -> Extracted {
    Extracted {
        id: first_present(row, &["id", "processId"]),
        name: first_present(row, &["name", "processName"]),
        command_line: first_present(row, &["commandLine"]),
        parent_id: first_present(row, &["parentId", "parentProcessId"]),
        parent_name: first_present(row, &["parentName"]),
        sha256: first_present(row, &["sha256"]),
        status: first_present(row, &["processState"]),
        timestamp: first_present(row, &["createdAt"]),
    }
}

// Defender rows carry no process state column.
pub fn defender(row: &RawRecord) -> Extracted {
    Extracted {
        id: first_present(row, &["ProcessId", "InitiatingProcessId"]),
        name: first_present(row, &["FileName", "InitiatingProcessFileName"]),
        command_line: first_present(
            row,
            &["ProcessCommandLine", "InitiatingProcessCommandLine"],
        ),
        parent_id: first_present(row, &["InitiatingProcessParentId"]),
        parent_name: first_present(row, &["InitiatingProcessParentFileName"]),
        sha256: first_present(row, &["SHA256"]),
        status: None,
        timestamp: first_present(row, &["TimeGenerated"]),
    }
}

/// Field names shared by the hunt command output (`edr_` prefix) and
/// provider-agnostic exports.
pub fn generic(row: &RawRecord) -> Extracted {
    Extracted {
        id: first_present(row, &["edr_process_id", "process_id", "id", "pid"]),
        name: first_present(row, &["edr_process_name", "process_name", "name"]),
        command_line: first_present(row, &["edr_command_line", "command_line", "commandLine"]),
        parent_id: first_present(
            row,
            &["edr_parent_process_id", "parent_process_id", "parentId", "parent_id", "ppid"],
        ),
        parent_name: first_present(
            row,
            &["edr_parent_process_name", "parent_process_name", "parentName"],
        ),
        sha256: first_present(row, &["edr_sha256", "sha256"]),
        status: first_present(row, &["edr_status", "status"]),
        timestamp: first_present(row, &["edr_timestamp", "timestamp", "time", "_time"]),
    }
}
