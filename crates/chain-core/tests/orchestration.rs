//! Orchestration loop behaviour against a scripted reasoning service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use chain_core::{
    Arguments, Conversation, Message, Orchestrator, OrchestratorBuilder, OrchestratorConfig,
    OrchestratorError, ParameterSchema, ReasoningService, Result, Role, Tool,
    ToolInvocationRequest, ToolOutcome, ToolRegistry, ToolSpec, TurnOutcome,
};

/// One recorded `submit` call
#[derive(Clone, Debug)]
struct Submission {
    messages: Vec<Message>,
    tool_names: Vec<String>,
}

/// Replays a fixed list of outcomes and records every submission
struct ScriptedService {
    script: Mutex<VecDeque<Result<TurnOutcome>>>,
    submissions: Mutex<Vec<Submission>>,
}

impl ScriptedService {
    fn new(script: Vec<Result<TurnOutcome>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            submissions: Mutex::new(Vec::new()),
        })
    }

    fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn submit(&self, conversation: &[Message], tools: &[ToolSpec]) -> Result<TurnOutcome> {
        self.submissions.lock().unwrap().push(Submission {
            messages: conversation.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TurnOutcome::Final("script exhausted".into())))
    }
}

/// Asks for a tool until the conversation holds a tool result, then answers
struct DeterministicService;

#[async_trait]
impl ReasoningService for DeterministicService {
    fn name(&self) -> &str {
        "deterministic"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn submit(&self, conversation: &[Message], _tools: &[ToolSpec]) -> Result<TurnOutcome> {
        if conversation.iter().any(|m| m.role == Role::ToolResult) {
            Ok(TurnOutcome::Final("done".into()))
        } else {
            Ok(TurnOutcome::ContinueWith(request("counter", json!({"input": "x"}))))
        }
    }
}

/// Records invocations and returns a canned outcome
struct CountingTool {
    name: &'static str,
    outcome: ToolOutcome,
    calls: AtomicUsize,
    seen: Mutex<Vec<Arguments>>,
}

impl CountingTool {
    fn new(name: &'static str, outcome: ToolOutcome) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcome,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for CountingTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.into(),
            description: format!("{} stub", self.name),
            parameters: vec![ParameterSchema {
                name: "input".into(),
                param_type: "string".into(),
                description: "Anything".into(),
                required: true,
                default: None,
                enum_values: None,
            }],
            category: None,
        }
    }

    async fn execute(&self, arguments: &Arguments) -> ToolOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(arguments.clone());
        self.outcome.clone()
    }
}

fn request(tool: &str, args: Value) -> ToolInvocationRequest {
    ToolInvocationRequest::new(tool, args.as_object().cloned().unwrap_or_default())
}

fn continue_with(tool: &str, args: Value) -> Result<TurnOutcome> {
    Ok(TurnOutcome::ContinueWith(request(tool, args)))
}

fn final_text(text: &str) -> Result<TurnOutcome> {
    Ok(TurnOutcome::Final(text.into()))
}

fn orchestrator(
    service: Arc<dyn ReasoningService>,
    tools: &[Arc<CountingTool>],
    max_turns: Option<usize>,
) -> Orchestrator {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register_arc(tool.clone()).unwrap();
    }
    let config = OrchestratorConfig {
        system_prompt: "system".into(),
        max_turns,
    };
    Orchestrator::new(service, Arc::new(registry), config)
}

#[tokio::test]
async fn single_tool_call_submits_three_times() {
    let service = ScriptedService::new(vec![
        continue_with("calculate", json!({"input": "2+2"})),
        final_text("It is 4"),
        final_text("2 + 2 = 4"),
    ]);
    let calc = CountingTool::new("calculate", ToolOutcome::success(4));
    let orch = orchestrator(service.clone(), &[calc.clone()], Some(10));

    let mut conversation = Conversation::for_request("system", "2+2");
    let answer = orch.run(&mut conversation).await.unwrap();

    assert_eq!(answer, "2 + 2 = 4");
    assert_eq!(calc.calls(), 1);

    let submissions = service.submissions();
    assert_eq!(submissions.len(), 3);
    assert_eq!(submissions[0].tool_names, vec!["calculate"]);
    assert_eq!(submissions[1].tool_names, vec!["calculate"]);
    assert!(submissions[2].tool_names.is_empty());

    let messages = conversation.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].role, Role::ToolResult);
    assert_eq!(messages[2].content, "4");
    assert_eq!(messages[2].tool_result_for.as_deref(), Some("calculate"));
    assert_eq!(messages[3].role, Role::Assistant);
    assert_eq!(
        messages[3].content,
        "I got the result: 4. Let me continue with the next operation if needed."
    );
}

#[tokio::test]
async fn chained_turns_grow_conversation_by_two() {
    let service = ScriptedService::new(vec![
        continue_with("lookup", json!({"input": "AAPL"})),
        continue_with("calculate", json!({"input": "189.84 * 7.8"})),
        continue_with("calculate", json!({"input": "1480.75 / 2"})),
        final_text("done"),
        final_text("closing"),
    ]);
    let lookup = CountingTool::new("lookup", ToolOutcome::success(json!({"symbol": "AAPL"})));
    let calc = CountingTool::new("calculate", ToolOutcome::success(1480.752));
    let orch = orchestrator(service.clone(), &[lookup.clone(), calc.clone()], None);

    let mut conversation = Conversation::for_request("system", "chain");
    orch.run(&mut conversation).await.unwrap();

    assert_eq!(lookup.calls(), 1);
    assert_eq!(calc.calls(), 2);

    let submissions = service.submissions();
    let lengths: Vec<usize> = submissions.iter().map(|s| s.messages.len()).collect();
    assert_eq!(lengths, vec![2, 4, 6, 8, 8]);

    // Every submission is a prefix of the next one.
    for pair in submissions.windows(2) {
        let (earlier, later) = (&pair[0].messages, &pair[1].messages);
        assert_eq!(&later[..earlier.len()], earlier.as_slice());
    }
    assert_eq!(conversation.messages(), submissions[4].messages.as_slice());
}

#[tokio::test]
async fn lookup_result_is_threaded_into_next_turn() {
    let service = ScriptedService::new(vec![
        continue_with("lookup", json!({"input": "AAPL"})),
        final_text("AAPL is 189.84 USD"),
        final_text("Apple trades at 189.84 USD."),
    ]);
    let lookup = CountingTool::new(
        "lookup",
        ToolOutcome::success(json!({"symbol": "AAPL", "current_price": 189.84})),
    );
    let calc = CountingTool::new("calculate", ToolOutcome::success(0));
    let orch = orchestrator(service.clone(), &[lookup.clone(), calc.clone()], Some(10));

    let answer = orch.ask("What's AAPL stock price?").await.unwrap();

    assert_eq!(answer, "Apple trades at 189.84 USD.");
    assert_eq!(lookup.calls(), 1);
    assert_eq!(calc.calls(), 0);
    assert_eq!(lookup.seen.lock().unwrap()[0]["input"], "AAPL");

    let second = &service.submissions()[1].messages;
    let relayed: serde_json::Value = serde_json::from_str(&second[2].content).unwrap();
    assert_eq!(relayed, json!({"symbol": "AAPL", "current_price": 189.84}));
}

#[tokio::test]
async fn unknown_tool_aborts_without_touching_conversation() {
    let service = ScriptedService::new(vec![continue_with("teleport", json!({}))]);
    let calc = CountingTool::new("calculate", ToolOutcome::success(4));
    let orch = orchestrator(service.clone(), &[calc.clone()], Some(10));

    let mut conversation = Conversation::for_request("system", "beam me up");
    let before = conversation.messages().to_vec();

    let err = orch.run(&mut conversation).await.unwrap_err();

    assert!(matches!(err, OrchestratorError::ToolNotFound(ref name) if name == "teleport"));
    assert_eq!(conversation.messages(), before.as_slice());
    assert_eq!(calc.calls(), 0);
    assert_eq!(service.submissions().len(), 1);
}

#[tokio::test]
async fn unknown_tool_after_successful_turn_keeps_earlier_turns() {
    let service = ScriptedService::new(vec![
        continue_with("calculate", json!({"input": "1+1"})),
        continue_with("teleport", json!({})),
    ]);
    let calc = CountingTool::new("calculate", ToolOutcome::success(2));
    let orch = orchestrator(service, &[calc], Some(10));

    let mut conversation = Conversation::for_request("system", "go");
    assert!(orch.run(&mut conversation).await.is_err());
    assert_eq!(conversation.len(), 4);
    assert_eq!(conversation.messages()[2].content, "2");
}

#[tokio::test]
async fn tool_failure_is_relayed_and_loop_continues() {
    let limited = "Search temporarily unavailable due to rate limiting. Please try again in a few moments.";
    let service = ScriptedService::new(vec![
        continue_with("search", json!({"input": "AAPL news"})),
        final_text("Search is rate limited"),
        final_text("I couldn't search right now."),
    ]);
    let search = CountingTool::new("search", ToolOutcome::failure(limited));
    let orch = orchestrator(service.clone(), &[search.clone()], Some(10));

    let answer = orch.ask("AAPL news").await.unwrap();

    assert_eq!(answer, "I couldn't search right now.");
    let second = &service.submissions()[1].messages;
    assert_eq!(second[2].role, Role::ToolResult);
    assert_eq!(second[2].content, limited);
}

#[tokio::test]
async fn invalid_arguments_are_reported_to_the_model() {
    let service = ScriptedService::new(vec![
        continue_with("calculate", json!({})),
        final_text("oops"),
        final_text("I need an expression."),
    ]);
    let calc = CountingTool::new("calculate", ToolOutcome::success(4));
    let orch = orchestrator(service.clone(), &[calc.clone()], Some(10));

    orch.ask("calc").await.unwrap();

    assert_eq!(calc.calls(), 0);
    let second = &service.submissions()[1].messages;
    assert_eq!(second[2].content, "Error: Missing required parameter: input");
}

#[tokio::test]
async fn turn_cap_aborts_runaway_service() {
    let script = (0..20)
        .map(|i| continue_with("calculate", json!({"input": format!("{i}+1")})))
        .collect();
    let service = ScriptedService::new(script);
    let calc = CountingTool::new("calculate", ToolOutcome::success(1));
    let orch = orchestrator(service, &[calc.clone()], Some(3));

    let err = orch.ask("loop forever").await.unwrap_err();

    assert!(matches!(err, OrchestratorError::MaxTurns(3)));
    assert_eq!(calc.calls(), 3);
}

#[tokio::test]
async fn tool_request_on_closing_pass_is_malformed() {
    let service = ScriptedService::new(vec![
        final_text("done"),
        continue_with("calculate", json!({"input": "1"})),
    ]);
    let calc = CountingTool::new("calculate", ToolOutcome::success(1));
    let orch = orchestrator(service, &[calc], Some(10));

    let err = orch.ask("hi").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::MalformedResponse(_)));
}

#[tokio::test]
async fn direct_answer_still_gets_closing_pass() {
    let service = ScriptedService::new(vec![final_text("Hello"), final_text("Hello there!")]);
    let orch = orchestrator(service.clone(), &[], Some(10));

    assert_eq!(orch.ask("hi").await.unwrap(), "Hello there!");
    assert_eq!(service.submissions().len(), 2);
}

#[tokio::test]
async fn provider_errors_are_fatal() {
    let service = ScriptedService::new(vec![Err(OrchestratorError::ProviderUnavailable(
        "connection refused".into(),
    ))]);
    let orch = orchestrator(service, &[], Some(10));

    let err = orch.ask("hi").await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn resubmitting_unchanged_state_yields_same_outcome_kind() {
    let service = DeterministicService;
    let conversation = Conversation::for_request("system", "count");
    let tools = [CountingTool::new("counter", ToolOutcome::success(1)).spec()];

    let first = service.submit(conversation.messages(), &tools).await.unwrap();
    let second = service.submit(conversation.messages(), &tools).await.unwrap();
    assert_eq!(first.is_final(), second.is_final());

    let counter = CountingTool::new("counter", ToolOutcome::success(1));
    let orch = orchestrator(Arc::new(DeterministicService), &[counter.clone()], Some(10));
    assert_eq!(orch.ask("count").await.unwrap(), "done");
    assert_eq!(counter.calls(), 1);
}

#[tokio::test]
async fn builder_rejects_duplicate_tools() {
    struct Named;

    #[async_trait]
    impl Tool for Named {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "dup".into(),
                description: String::new(),
                parameters: Vec::new(),
                category: None,
            }
        }

        async fn execute(&self, _arguments: &Arguments) -> ToolOutcome {
            ToolOutcome::success(Value::Null)
        }
    }

    let result = OrchestratorBuilder::new()
        .service(Arc::new(DeterministicService))
        .tool(Named)
        .tool(Named)
        .build();

    assert!(matches!(result, Err(OrchestratorError::DuplicateTool(_))));
}
