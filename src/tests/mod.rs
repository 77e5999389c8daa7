mod api_notion_http_client;
