use super::{bulk_lines, DataStore, StoreError};
use crate::model::{format_day, AllData, GradeBatch};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

const GET_ALL: &str = "obtenerDatosCompletos";
const MANAGE_STUDENTS: &str = "gestionarEstudiantesGAS";
const SAVE_BATCH: &str = "guardarRegistroBatch";
const EDIT_SCORE: &str = "editarNotaGAS";
const DELETE_SCORE: &str = "eliminarNotaGAS";

/// Transport to the spreadsheet backend: invoke a named procedure with
/// positional arguments and wait for its single answer.
pub trait Bridge {
    fn call(&mut self, procedure: &str, args: Vec<Value>) -> Result<Value, StoreError>;
}

/// Bridge running as a child process, spoken to with the same JSON-lines
/// envelope the daemon itself answers on stdio.
pub struct ProcessBridge {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl ProcessBridge {
    pub fn spawn(program: &Path, args: &[String]) -> std::io::Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("bridge stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("bridge stdout unavailable"))?;
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 1,
        })
    }
}

impl Bridge for ProcessBridge {
    fn call(&mut self, procedure: &str, args: Vec<Value>) -> Result<Value, StoreError> {
        let id = self.next_id.to_string();
        self.next_id += 1;

        let payload = json!({
            "id": id,
            "method": procedure,
            "params": args,
        });
        tracing::debug!(procedure, id = %id, "bridge call");
        writeln!(self.stdin, "{}", payload)?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(StoreError::BridgeClosed {
                procedure: procedure.to_string(),
            });
        }
        parse_response(procedure, &id, line.trim())
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn parse_response(procedure: &str, id: &str, line: &str) -> Result<Value, StoreError> {
    let resp: Value = serde_json::from_str(line)
        .map_err(|e| StoreError::Protocol(format!("unparsable answer to {procedure}: {e}")))?;
    let resp_id = resp.get("id").and_then(|v| v.as_str()).unwrap_or("");
    if resp_id != id {
        return Err(StoreError::Protocol(format!(
            "answer id {resp_id:?} does not match request {id:?}"
        )));
    }
    if resp.get("ok").and_then(|v| v.as_bool()) == Some(true) {
        return Ok(resp.get("result").cloned().unwrap_or(Value::Null));
    }
    let error = resp.get("error");
    Err(StoreError::Remote {
        procedure: procedure.to_string(),
        code: error
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("remote_error")
            .to_string(),
        message: error
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("remote call rejected")
            .to_string(),
    })
}

/// Spreadsheet-backed store. Each operation is exactly one named procedure
/// call with a fixed argument list.
pub struct RemoteStore<B> {
    bridge: B,
}

impl<B: Bridge> RemoteStore<B> {
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }

    fn call(&mut self, procedure: &str, args: Vec<Value>) -> Result<Value, StoreError> {
        self.bridge.call(procedure, args).inspect_err(|e| {
            tracing::warn!(procedure, error = %e, "remote call failed");
        })
    }
}

impl<B: Bridge> DataStore for RemoteStore<B> {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    fn get_all_data(&mut self) -> Result<AllData, StoreError> {
        let result = self.call(GET_ALL, vec![])?;
        if result.is_null() {
            return Ok(AllData::default());
        }
        Ok(serde_json::from_value(result)?)
    }

    fn add_student(
        &mut self,
        last_name: &str,
        first_name: &str,
        grade: &str,
    ) -> Result<(), StoreError> {
        self.call(
            MANAGE_STUDENTS,
            vec![
                json!("crear_individual"),
                json!({ "lastName": last_name, "firstName": first_name, "grade": grade }),
            ],
        )?;
        Ok(())
    }

    fn add_students_bulk(&mut self, text: &str, grade: &str) -> Result<usize, StoreError> {
        // Blank lines never reach the backend, so its count matches ours.
        let texto = bulk_lines(text).join("\n");
        let result = self.call(
            MANAGE_STUDENTS,
            vec![
                json!("crear_lote"),
                json!({ "texto": texto, "grade": grade }),
            ],
        )?;
        let count = result.get("count").and_then(|v| v.as_u64()).unwrap_or(0);
        Ok(count as usize)
    }

    fn save_grade_batch(&mut self, batch: &GradeBatch) -> Result<(), StoreError> {
        self.call(
            SAVE_BATCH,
            vec![json!({
                "fecha": format_day(batch.date),
                "grado": batch.grade,
                "materia": batch.subject,
                "categoria": batch.category,
                "puntuaciones": batch.scores,
            })],
        )?;
        Ok(())
    }

    fn edit_record(&mut self, id: &str, new_score: f64) -> Result<(), StoreError> {
        self.call(EDIT_SCORE, vec![json!(id), json!(new_score)])?;
        Ok(())
    }

    fn delete_record(&mut self, id: &str) -> Result<(), StoreError> {
        self.call(DELETE_SCORE, vec![json!(id)])?;
        Ok(())
    }
}
