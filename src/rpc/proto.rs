//! Message and client types for the `flix.transfer.FileTransfer` service
//!
//! Kept in tonic-build output shape and maintained by hand against
//! `proto/filetransfer.proto` so the build does not need protoc.

/// Zero-field request message, wire-compatible with `google.protobuf.Empty`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferRequest {}

/// One chunk of a transfer reply. The probe never consumes the payload; it
/// only cares whether a message arrives at all.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferReply {
    #[prost(bytes = "vec", tag = "1")]
    pub chunk: ::prost::alloc::vec::Vec<u8>,
}

pub mod file_transfer_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::wildcard_imports)]
    use tonic::codegen::*;

    /// Client for the Flix file-transfer service
    #[derive(Debug, Clone)]
    pub struct FileTransferClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl<T> FileTransferClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        /// Open the bidirectional transfer stream
        pub async fn transfer(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::TransferRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::TransferReply>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/flix.transfer.FileTransfer/Transfer");
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("flix.transfer.FileTransfer", "Transfer"));
            self.inner.streaming(req, path, codec).await
        }
    }
}
