//! 延迟调用解析
//!
//! 接收者类型在调用点未知（或方法尚未定义）时，调用被记入队列；
//! 主遍历结束后分轮解析，直到队列清空或无法再取得进展。

use super::env::TypeEnvironment;
use super::errors::{ClashContext, TypeError, TypeResult};
use super::infer::TypeInferrer;
use crate::frontend::core::type_system::MonoType;
use tracing::{debug, trace};

/// 等待第二遍解析的调用
#[derive(Debug, Clone)]
pub struct PendingCall {
    /// 入队时的接收者类型
    pub receiver: MonoType,
    pub method: String,
    /// 由调用点合成的 `Fn(args..., ret)`
    pub synthesized: MonoType,
    pub arg_count: usize,
    pub line: usize,
    /// 调用点的环境快照
    pub env: TypeEnvironment,
}

impl TypeInferrer {
    /// 第二遍：解析所有延迟调用
    pub(super) fn resolve_deferred(&mut self) -> TypeResult<()> {
        let mut queue = std::mem::take(&mut self.deferred);
        let mut round = 0;

        while !queue.is_empty() {
            if round >= self.config.max_deferred_rounds {
                return Err(self.unresolved_receiver(&queue[0]));
            }
            round += 1;
            debug!(round, pending = queue.len(), "resolving deferred calls");

            let before = queue.len();
            let mut remaining = Vec::new();
            for call in queue {
                let receiver = self.solver.prune(&call.receiver);
                if receiver.is_var() {
                    remaining.push(call);
                    continue;
                }
                self.resolve_call(&call, &receiver)?;
            }

            if remaining.len() == before {
                return Err(self.unresolved_receiver(&remaining[0]));
            }
            queue = remaining;
        }
        Ok(())
    }

    fn resolve_call(
        &mut self,
        call: &PendingCall,
        receiver: &MonoType,
    ) -> TypeResult<()> {
        trace!(method = %call.method, receiver = %receiver, line = call.line, "resolving deferred call");

        // 先查调用点的快照，再查最终环境（方法可能定义在调用点之后）
        let found = self
            .find_method(receiver, &call.method, &call.env)
            .or_else(|| self.find_method(receiver, &call.method, &self.env));
        let Some(found) = found else {
            return Err(self.undefined_method(receiver, &call.method, call.line));
        };

        let callee = self.instantiate_found(found);
        let callee = self.solver.prune(&callee);
        if let Some((params, _)) = callee.as_fn() {
            if params.len() != call.arg_count {
                return Err(TypeError::ArgumentCount {
                    method: call.method.clone(),
                    expected: params.len(),
                    found: call.arg_count,
                    line: Some(call.line),
                });
            }
        }

        let context = ClashContext::DeferredCall {
            owner: self.solver.describe(receiver),
            method: call.method.clone(),
        };
        self.unify_in(&callee, &call.synthesized, context, call.line)
    }

    fn unresolved_receiver(
        &mut self,
        call: &PendingCall,
    ) -> TypeError {
        let fallback = format!(
            "Not enough information to infer receiver type of `{}` (line {})",
            call.method, call.line
        );
        match self.solver.prune(&call.receiver).type_var() {
            Some(var) => self.not_enough_information(var, fallback, call.line),
            None => TypeError::not_enough_information(fallback, Some(call.line)),
        }
    }
}
